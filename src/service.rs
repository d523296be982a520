pub(crate) mod auth;
pub mod firestore;

pub(crate) async fn create_channel(
    domain: &str,
) -> Result<tonic::transport::Channel, firestore::Error> {
    let tls = tonic::transport::ClientTlsConfig::new().domain_name(domain);
    let uri: http::uri::Uri = ["https://", domain].concat().parse()?;
    let channel = tonic::transport::Channel::builder(uri)
        .tls_config(tls)?
        .connect()
        .await?;
    Ok(channel)
}
