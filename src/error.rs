use thiserror::Error;

/// Errors raised while placing, wiring or loading chips.
///
/// The per-tick transition of a chip never fails; everything here comes from
/// parsing placement lines, resolving pins, or reading circuit descriptions.
#[derive(Debug, Error)]
pub enum ChipError {
    #[error("placement line is missing the {0} field")]
    MissingField(&'static str),

    #[error("invalid number '{value}' for field {field}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("invalid pin level '{0}', expected true/false, 1/0 or a voltage")]
    InvalidBool(String),

    #[error("placement has dump type {found}, expected {expected}")]
    DumpTypeMismatch { expected: u32, found: u32 },

    #[error("no chip registered for dump type {0}")]
    UnknownDumpType(u32),

    #[error("unknown component type: {0}")]
    UnknownComponentType(String),

    #[error("component not found: {0}")]
    UnknownComponent(String),

    #[error("component {component} has no pin labelled '{label}'")]
    UnknownPinLabel { component: String, label: String },

    #[error("pin handle {0} is not allocated")]
    UnknownPin(usize),

    #[error("chip entry '{0}' needs either a placement line or a component type")]
    IncompleteChipEntry(String),

    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse circuit description: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ChipResult<T> = Result<T, ChipError>;
