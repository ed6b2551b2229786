//! Endpoints and headers of the chapter document API

/// Whole chapter collection (GET / POST)
pub const CHAPTERS_ENDPOINT: &str = "chapters";

/// Exercise creation under a step
pub fn step_exercises_endpoint(step_id: &str) -> String {
    format!("steps/{}/exercises", urlencoding::encode(step_id))
}

/// Single exercise (PUT / DELETE)
pub fn exercise_endpoint(exercise_id: &str) -> String {
    format!("exercises/{}", urlencoding::encode(exercise_id))
}

/// Join the configured base URL and an endpoint path
pub fn endpoint_url(base_url: &str, endpoint: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), endpoint)
}

pub mod headers {
    pub const CONTENT_TYPE_JSON: &str = "application/json";
    pub const ACCEPT_JSON: &str = "application/json";
    pub const USER_AGENT: &str = concat!("lms-admin/", env!("CARGO_PKG_VERSION"));
    /// Correlation id attached to every request for server-side log matching
    pub const REQUEST_ID: &str = "X-Request-Id";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_escaped_in_paths() {
        assert_eq!(step_exercises_endpoint("etape 1/2"), "steps/etape%201%2F2/exercises");
        assert_eq!(exercise_endpoint("id_abc_1"), "exercises/id_abc_1");
    }

    #[test]
    fn test_endpoint_url() {
        assert_eq!(
            endpoint_url("http://localhost:5000/api/", CHAPTERS_ENDPOINT),
            "http://localhost:5000/api/chapters"
        );
    }
}
