// src/services/storage.rs

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Deserialize;

use crate::{common::error::AppError, config::StorageConfig};

// Cliente do serviço de armazenamento de objetos (API compatível com
// Appwrite Storage). O fluxo de imagem é sempre o mesmo: sobe o arquivo,
// busca o preview em bytes e devolve uma data-URL base64 que é gravada no
// registro no lugar de um link externo.
#[derive(Clone)]
pub struct StorageService {
    http: reqwest::Client,
    endpoint: String,
    project_id: String,
    api_key: String,
    bucket_id: String,
}

// Imagem já carregada no bucket, pronta para ser gravada no banco.
// `file_id` fica à mão para o descarte compensatório se a gravação falhar.
#[derive(Debug, Clone)]
pub struct StagedImage {
    pub file_id: String,
    pub data_url: String,
}

#[derive(Deserialize)]
struct StorageFile {
    #[serde(rename = "$id")]
    id: String,
}

impl StorageService {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.endpoint,
            project_id: config.project_id,
            api_key: config.api_key,
            bucket_id: config.bucket_id,
        }
    }

    // Upload + preview em data-URL. Qualquer falha aqui vira
    // `AppError::StorageError` (502) e nada é gravado no banco.
    pub async fn stage_image(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StagedImage, AppError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)?;

        let form = reqwest::multipart::Form::new()
            .text("fileId", "unique()")
            .part("file", part);

        let file: StorageFile = self
            .http
            .post(format!(
                "{}/storage/buckets/{}/files",
                self.endpoint, self.bucket_id
            ))
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Key", &self.api_key)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::debug!("Imagem enviada ao bucket: {}", file.id);

        let preview = self
            .http
            .get(format!(
                "{}/storage/buckets/{}/files/{}/preview",
                self.endpoint, self.bucket_id, file.id
            ))
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Key", &self.api_key)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let data_url = format!("data:image/png;base64,{}", STANDARD.encode(&preview));

        Ok(StagedImage {
            file_id: file.id,
            data_url,
        })
    }

    // Descarte compensatório: a gravação no banco falhou depois do upload.
    // Melhor esforço; se o delete também falhar, só registra o órfão.
    pub async fn discard(&self, file_id: &str) {
        let result = self
            .http
            .delete(format!(
                "{}/storage/buckets/{}/files/{}",
                self.endpoint, self.bucket_id, file_id
            ))
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Key", &self.api_key)
            .send()
            .await
            .and_then(|resp| resp.error_for_status());

        if let Err(e) = result {
            tracing::warn!("Arquivo órfão {} não pôde ser descartado: {}", file_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(endpoint: String) -> StorageService {
        StorageService::new(StorageConfig {
            endpoint,
            project_id: "projeto-teste".to_string(),
            api_key: "chave-teste".to_string(),
            bucket_id: "imagens".to_string(),
        })
    }

    #[tokio::test]
    async fn stage_image_sobe_busca_preview_e_codifica_data_url() {
        let server = MockServer::start().await;
        let preview_bytes: Vec<u8> = vec![0x89, 0x50, 0x4e, 0x47];

        Mock::given(method("POST"))
            .and(path("/storage/buckets/imagens/files"))
            .and(header("X-Appwrite-Project", "projeto-teste"))
            .and(header("X-Appwrite-Key", "chave-teste"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({ "$id": "arq1" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/storage/buckets/imagens/files/arq1/preview"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(preview_bytes.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let staged = service(server.uri())
            .stage_image("capacete.png", "image/png", vec![1, 2, 3])
            .await
            .unwrap();

        assert_eq!(staged.file_id, "arq1");
        assert_eq!(
            staged.data_url,
            format!("data:image/png;base64,{}", STANDARD.encode(&preview_bytes))
        );
    }

    #[tokio::test]
    async fn falha_no_upload_vira_storage_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/storage/buckets/imagens/files"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = service(server.uri())
            .stage_image("capacete.png", "image/png", vec![1, 2, 3])
            .await;

        assert!(matches!(result, Err(AppError::StorageError(_))));
    }

    #[tokio::test]
    async fn discard_remove_o_arquivo_do_bucket() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/storage/buckets/imagens/files/arq1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        service(server.uri()).discard("arq1").await;
        // O mock verifica a chamada no drop do servidor
    }

    #[tokio::test]
    async fn discard_nao_propaga_falha() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        // Não deve entrar em pânico nem devolver erro
        service(server.uri()).discard("arq1").await;
    }
}
