//! HTTP client for the UniProt REST endpoints.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use protmatch_core::config::UniProtConfig;
use protmatch_core::sequence::{self, Accession, SequenceRecord};
use protmatch_core::{ProtmatchError, SequenceFetcher};

use crate::protocol::ProteinEntry;

/// Client for the FASTA and JSON protein endpoints.
pub struct UniProtClient {
    client: Client,
    fasta_endpoint: String,
    json_endpoint: String,
}

impl UniProtClient {
    pub fn new(config: &UniProtConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            fasta_endpoint: config.fasta_endpoint.trim_end_matches('/').to_string(),
            json_endpoint: config.json_endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// Download the raw FASTA text of a record.
    #[instrument(skip(self))]
    pub async fn fetch_fasta(&self, accession: &Accession) -> anyhow::Result<String> {
        let url = format!("{}/{}.fasta", self.fasta_endpoint, accession);
        let resp = self.client.get(&url).send().await?;
        let body = resp.error_for_status()?.text().await?;
        debug!("Received {} bytes of FASTA", body.len());
        Ok(body)
    }

    /// Download and parse a FASTA record.
    pub async fn fetch_record(&self, accession: &Accession) -> anyhow::Result<SequenceRecord> {
        let body = self.fetch_fasta(accession).await?;
        Ok(sequence::parse(&body)?)
    }

    /// Fetch the JSON entry with names, organism and sequence statistics.
    #[instrument(skip(self))]
    pub async fn fetch_entry(&self, accession: &Accession) -> anyhow::Result<ProteinEntry> {
        let url = format!("{}/{}", self.json_endpoint, accession);
        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let entry: ProteinEntry = resp.error_for_status()?.json().await?;
        debug!("Entry {} is {} residues", entry.accession, entry.sequence.length);
        Ok(entry)
    }
}

#[async_trait]
impl SequenceFetcher for UniProtClient {
    async fn fetch_sequence(&self, accession: &Accession) -> protmatch_core::Result<SequenceRecord> {
        self.fetch_record(accession)
            .await
            .map_err(|e| ProtmatchError::Fetch(format!("{accession}: {e:#}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::StatusCode, response::IntoResponse, routing::get, Router};
    use tokio::net::TcpListener;

    async fn fasta(Path(file): Path<String>) -> impl IntoResponse {
        match file.as_str() {
            "Q9Y7B1.fasta" => (
                StatusCode::OK,
                ">sp|Q9Y7B1|PSA3_SCHPO Proteasome subunit\nMAAKLL\nPQRS\n".to_string(),
            ),
            "BROKEN.fasta" => (StatusCode::OK, "\n".to_string()),
            _ => (StatusCode::NOT_FOUND, "Error".to_string()),
        }
    }

    async fn entry(Path(accession): Path<String>) -> impl IntoResponse {
        if accession != "Q9Y7B1" {
            return (StatusCode::NOT_FOUND, String::new());
        }
        let body = serde_json::json!({
            "accession": "Q9Y7B1",
            "id": "PSA3_SCHPO",
            "organism": {"taxonomy": 284812, "names": [{"type": "scientific", "value": "Schizosaccharomyces pombe"}]},
            "sequence": {"length": 10, "mass": 1130, "sequence": "MAAKLLPQRS"}
        });
        (StatusCode::OK, body.to_string())
    }

    async fn spawn_server() -> UniProtClient {
        let app = Router::new()
            .route("/uniprotkb/:file", get(fasta))
            .route("/proteins/:accession", get(entry));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        UniProtClient::new(&UniProtConfig {
            fasta_endpoint: format!("http://{addr}/uniprotkb/"),
            json_endpoint: format!("http://{addr}/proteins"),
            timeout_seconds: 5,
        })
    }

    #[tokio::test]
    async fn fetches_and_parses_fasta() {
        let client = spawn_server().await;
        let record = client.fetch_sequence(&Accession::new("Q9Y7B1")).await.unwrap();
        assert_eq!(record.accession, Accession::new("Q9Y7B1"));
        assert_eq!(record.sequence, "MAAKLLPQRS");
        assert!(record.title.starts_with(">sp|Q9Y7B1|"));
    }

    #[tokio::test]
    async fn missing_record_is_a_fetch_error() {
        let client = spawn_server().await;
        let err = client
            .fetch_sequence(&Accession::new("NOPE1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProtmatchError::Fetch(_)));
    }

    #[tokio::test]
    async fn unparseable_body_is_a_fetch_error() {
        let client = spawn_server().await;
        let err = client
            .fetch_sequence(&Accession::new("BROKEN"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProtmatchError::Fetch(_)));
    }

    #[tokio::test]
    async fn fetches_json_entry() {
        let client = spawn_server().await;
        let entry = client.fetch_entry(&Accession::new("Q9Y7B1")).await.unwrap();
        assert_eq!(entry.id, "PSA3_SCHPO");
        assert_eq!(entry.scientific_name(), Some("Schizosaccharomyces pombe"));
        assert_eq!(entry.sequence.sequence, "MAAKLLPQRS");
        assert!(entry.full_name().is_none());

        assert!(client.fetch_entry(&Accession::new("NOPE1")).await.is_err());
    }
}
