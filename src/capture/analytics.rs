pub const EMAIL_SUBMIT_EVENT: &str = "Email Submit";

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AnalyticsEvent {
    pub name: &'static str,
    pub section: String,
    pub plan: String,
}

/// Best-effort side channel. Errors are reported to the caller only so they
/// can be logged; they never change the outcome of a capture.
pub trait Analytics: Send + Sync {
    fn track(&self, event: &AnalyticsEvent) -> Result<(), anyhow::Error>;
}

/// Records analytics events in the application log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnalytics;

impl Analytics for TracingAnalytics {
    fn track(&self, event: &AnalyticsEvent) -> Result<(), anyhow::Error> {
        tracing::info!(
            event.name = event.name,
            event.section = %event.section,
            event.plan = %event.plan,
            "Analytics event"
        );
        Ok(())
    }
}
