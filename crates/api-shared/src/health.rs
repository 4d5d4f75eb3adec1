use crate::dto::HealthRes;

/// Health check behind the REST server's `GET /health` route.
pub struct HealthService;

impl HealthService {
    /// Static method to check health without creating an instance
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Pulse is alive".into(),
        }
    }
}
