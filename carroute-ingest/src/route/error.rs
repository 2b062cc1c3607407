//! Errors raised while building the route model from a response.

/// Error during DTO to route-model conversion or path assembly.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// The response could not be read into the response DTOs
    #[error("malformed response: {0}")]
    Json(String),

    /// A required field is absent; carries the full field path
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A segment window outside `[0, 1]`
    #[error("invalid segment window at {path}: [{begin}, {end}]")]
    InvalidSegment { path: String, begin: f64, end: f64 },

    /// A geometry token that is not `"lon lat"`
    #[error("invalid coordinate {token:?} in edge {edge_id}")]
    InvalidCoordinate { edge_id: i64, token: String },

    /// A coordinate rejected by the projection range guard
    #[error("coordinate out of projection range in edge {edge_id}")]
    OutOfRange { edge_id: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ConversionError::MissingField("driving_direction.items[2].instruction".into());
        assert_eq!(
            err.to_string(),
            "missing required field: driving_direction.items[2].instruction"
        );

        let err = ConversionError::InvalidSegment {
            path: "items[0].edges[1].segment".into(),
            begin: 0.5,
            end: 1.5,
        };
        assert_eq!(
            err.to_string(),
            "invalid segment window at items[0].edges[1].segment: [0.5, 1.5]"
        );

        let err = ConversionError::InvalidCoordinate {
            edge_id: 7,
            token: "37.6".into(),
        };
        assert_eq!(err.to_string(), "invalid coordinate \"37.6\" in edge 7");

        let err = ConversionError::OutOfRange { edge_id: 7 };
        assert_eq!(
            err.to_string(),
            "coordinate out of projection range in edge 7"
        );
    }
}
