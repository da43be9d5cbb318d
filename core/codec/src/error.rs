use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("unknown field number {0} while decoding in strict mode")]
    UnknownField(u32),
    #[error("field {0}: expected {1}, found a value that does not fit")]
    WrongType(u32, &'static str),
    #[error("buffer ended before a complete value could be read")]
    Truncated,
    #[error("varint or length value exceeds the supported range")]
    Overflow,
    #[error("required field {0} is missing")]
    MissingRequired(u32),
    #[error("field number {0} used twice in the same container")]
    DuplicateField(u32),
}
