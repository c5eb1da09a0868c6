pub mod artifact;
pub mod event;
pub mod keys;
pub mod response;
pub mod text;

pub use self::{
    artifact::ProcessedArtifact,
    event::{classify, is_truthy, EventError, InboundEvent, TextRequest, UploadNotification},
    response::{ApiGatewayResponse, DispatchResponse, SkippedResponse},
    text::TextAction,
};

/// Timestamp in the shape javascript's `Date.toISOString` produces,
/// e.g. `2024-03-01T12:00:00.000Z`.
pub fn iso_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub mod base64 {
    use base64::Engine as _;

    pub const B64: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

    pub fn encode<T: AsRef<[u8]>>(data: T) -> String {
        B64.encode(data)
    }

    pub fn decode<T: AsRef<[u8]>>(data: T) -> Result<Vec<u8>, base64::DecodeError> {
        B64.decode(data)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_timestamp_has_millis_and_zulu() {
        let ts = iso_timestamp();
        assert!(ts.ends_with('Z'), "{}", ts);
        // 2024-03-01T12:00:00.000Z
        assert_eq!(ts.len(), 24, "{}", ts);
        assert_eq!(&ts[19..20], ".");
    }
}
