#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Financial table not found: no table header contains '{marker}'")]
    TableNotFound { marker: &'static str },
}
