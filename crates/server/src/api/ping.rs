/// `/ping` is the one endpoint that answers with plain text, not JSON
/// (SPEC_FULL §6).
pub async fn ping() -> &'static str {
    "pong"
}
