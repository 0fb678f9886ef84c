/// Aggregated view of session progress, useful for headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub score: u32,
    pub remaining_seconds: u32,
    pub is_complete: bool,
}
