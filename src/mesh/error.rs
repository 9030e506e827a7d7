use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("No attribute: {0} found")]
    UnknownAttribute(String),

    #[error("Attribute {name} takes 1 to 4 values, got {len}")]
    AttributeLength { name: String, len: usize },

    #[error("Too few numbers for {name}: need at least 3, got {len}")]
    TooFewComponents { name: &'static str, len: usize },

    #[error("Line {line}: {reason}")]
    Format { line: usize, reason: String },

    #[error("Primitive size must be at least 1")]
    ZeroPrimitiveSize,

    #[error("{len} indices do not form whole primitives of size {size}")]
    PartialPrimitive { len: usize, size: usize },

    #[error("Index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MeshError {
    pub(crate) fn format(line: usize, reason: impl Into<String>) -> Self {
        Self::Format { line, reason: reason.into() }
    }
}
