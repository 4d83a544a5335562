/// Database-generated row identifier.
pub type Id = i64;

/// Parses a query parameter the way list endpoints expect: anything that is
/// not a positive base-10 integer means "no constraint".
pub fn positive_param(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|value| *value > 0)
}

/// Parses a path id. Unlike query parameters, a malformed or non-positive id
/// is rejected.
pub fn parse_path_id(raw: &str) -> Result<Id, String> {
    match raw.trim().parse::<Id>() {
        Ok(id) if id > 0 => Ok(id),
        Ok(id) => Err(format!("Wrong ID format: {} is not a positive id", id)),
        Err(e) => Err(format!("Wrong ID format: {}", e)),
    }
}
