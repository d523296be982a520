mod error;
mod query;

pub use error::Error;

use super::{auth::Credentials, create_channel};
use crate::{
    config::DatabaseSetting,
    filter::Filter,
    proto::google::firestore::v1::{
        firestore_client::FirestoreClient, run_query_request::QueryType, Document,
        GetDocumentRequest, ListDocumentsRequest, RunQueryRequest, UpdateDocumentRequest,
    },
    serde_document::Fields,
    store::{BackendError, DocumentBackend, StoredDocument},
};
use async_trait::async_trait;
use tonic::{metadata::MetadataValue, transport::Channel, Code, Request};
use tracing::{debug, info};

const DOMAIN: &str = "firestore.googleapis.com";
const SCOPE: &str = "https://www.googleapis.com/auth/datastore";
const PAGE_SIZE: i32 = 300;

/// A `DocumentBackend` talking to Cloud Firestore over gRPC.
pub struct FirestoreBackend {
    channel: Channel,
    credentials: Credentials,
    database: String,
}

impl FirestoreBackend {
    pub async fn connect(setting: &DatabaseSetting) -> Result<Self, Error> {
        if setting.project_id().is_empty() {
            return Err(Error::Config("project_id is required"));
        }
        let channel = create_channel(DOMAIN).await?;
        info!(
            project_id = %setting.project_id(),
            auth_domain = %setting.auth_domain(),
            "connected to firestore"
        );
        Ok(FirestoreBackend {
            channel,
            credentials: Credentials::from_setting(setting),
            database: setting.database_path(),
        })
    }

    async fn client(&self) -> Result<FirestoreClient<Channel>, Error> {
        let (key, value) = self.credentials.header(SCOPE).await?;
        let auth = header_value(&value)?;
        let prefix = header_value(&self.database)?;
        let client = FirestoreClient::with_interceptor(
            self.channel.clone(),
            move |mut req: Request<()>| {
                let metadata = req.metadata_mut();
                metadata.insert("google-cloud-resource-prefix", prefix.clone());
                metadata.insert(key, auth.clone());
                Ok(req)
            },
        );
        Ok(client)
    }

    fn documents_path(&self) -> String {
        format!("{}/documents", self.database)
    }

    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_path(), collection, id)
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), Error> {
        let mut client = self.client().await?;
        // No update mask, so every existing field is replaced.
        let request = Request::new(UpdateDocumentRequest {
            document: Some(Document {
                name: self.document_name(collection, id),
                fields,
                ..Default::default()
            }),
            ..Default::default()
        });
        client.update_document(request).await?;
        Ok(())
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Fields>, Error> {
        let mut client = self.client().await?;
        let request = Request::new(GetDocumentRequest {
            name: self.document_name(collection, id),
            ..Default::default()
        });
        match client.get_document(request).await {
            Ok(response) => Ok(Some(response.into_inner().fields)),
            Err(status) if status.code() == Code::NotFound => Ok(None),
            Err(status) => Err(status.into()),
        }
    }

    async fn list_documents(&self, collection: &str) -> Result<Vec<StoredDocument>, Error> {
        let mut client = self.client().await?;
        let mut documents = Vec::new();
        let mut page_token = String::new();
        loop {
            let request = Request::new(ListDocumentsRequest {
                parent: self.documents_path(),
                collection_id: collection.to_string(),
                page_size: PAGE_SIZE,
                page_token,
                ..Default::default()
            });
            let response = client.list_documents(request).await?.into_inner();
            debug!(
                collection = %collection,
                count = response.documents.len(),
                "listed document page"
            );
            documents.extend(response.documents.into_iter().map(stored_document));
            if response.next_page_token.is_empty() {
                break;
            }
            page_token = response.next_page_token;
        }
        Ok(documents)
    }

    async fn run_query(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<StoredDocument>, Error> {
        let mut client = self.client().await?;
        let request = Request::new(RunQueryRequest {
            parent: self.documents_path(),
            query_type: Some(QueryType::StructuredQuery(query::structured_query(
                collection, filter,
            ))),
            ..Default::default()
        });
        let mut stream = client.run_query(request).await?.into_inner();
        let mut documents = Vec::new();
        while let Some(response) = stream.message().await? {
            if let Some(document) = response.document {
                documents.push(stored_document(document));
            }
        }
        Ok(documents)
    }
}

#[async_trait]
impl DocumentBackend for FirestoreBackend {
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), BackendError> {
        Ok(self.update_document(collection, id, fields).await?)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Fields>, BackendError> {
        Ok(self.get_document(collection, id).await?)
    }

    async fn list(
        &self,
        collection: &str,
        filter: Option<&Filter>,
    ) -> Result<Vec<StoredDocument>, BackendError> {
        let documents = match filter {
            Some(filter) if !filter.is_empty() => self.run_query(collection, filter).await?,
            _ => self.list_documents(collection).await?,
        };
        Ok(documents)
    }
}

fn header_value(value: &str) -> Result<MetadataValue<tonic::metadata::Ascii>, Error> {
    MetadataValue::from_str(value).map_err(|e| Error::InvalidHeader(e.to_string()))
}

fn stored_document(document: Document) -> StoredDocument {
    StoredDocument {
        id: document_id(&document.name).to_string(),
        fields: document.fields,
    }
}

fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::document_id;

    #[test]
    fn test_document_id() {
        assert_eq!(
            "alice",
            document_id("projects/p/databases/(default)/documents/users/alice")
        );
        assert_eq!("alice", document_id("alice"));
    }
}
