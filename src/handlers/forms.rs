// src/handlers/forms.rs

use axum::extract::Multipart;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::common::error::AppError;

// Arquivo de imagem recebido num formulário multipart
pub struct UploadedImage {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

// Converte um formulário multipart em payload tipado + imagem opcional.
//
// Os campos de texto viram strings num objeto JSON e o payload é
// desserializado a partir dele. Campos numéricos e booleanos chegam
// como string em formulários, então os payloads usam os
// desserializadores de models::normalize para aceitar os dois formatos.
//
// O campo "image" é especial: com filename é tratado como arquivo;
// sem filename é texto comum (o frontend manda a URL atual ou "").
pub async fn parse_form<P>(mut multipart: Multipart) -> Result<(P, Option<UploadedImage>), AppError>
where
    P: DeserializeOwned,
{
    let mut fields = Map::new();
    let mut image: Option<UploadedImage> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidForm(e.to_string()))?
    {
        let name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };

        let is_file = field.file_name().is_some();

        if name == "image" && is_file {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidForm(e.to_string()))?;

            // Parte de arquivo vazia equivale a não enviar imagem
            if !bytes.is_empty() {
                image = Some(UploadedImage {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::InvalidForm(e.to_string()))?;

        fields.insert(name, Value::String(text));
    }

    let payload = serde_json::from_value(Value::Object(fields))
        .map_err(|e| AppError::InvalidForm(e.to_string()))?;

    Ok((payload, image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        extract::FromRequest,
        http::{Request, header::CONTENT_TYPE},
    };
    use serde::Deserialize;

    use crate::models::normalize;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct FormularioDeTeste {
        name: String,
        #[serde(default, deserialize_with = "normalize::opt_int_flex")]
        lifespan: Option<i64>,
        #[serde(default, deserialize_with = "normalize::bool_flex")]
        has_uv_protection: bool,
    }

    async fn multipart_de(body: &str) -> Multipart {
        let request = Request::builder()
            .header(CONTENT_TYPE, "multipart/form-data; boundary=limite")
            .body(Body::from(body.to_string()))
            .unwrap();

        Multipart::from_request(request, &()).await.unwrap()
    }

    #[tokio::test]
    async fn campos_de_texto_viram_payload_tipado() {
        let body = concat!(
            "--limite\r\n",
            "Content-Disposition: form-data; name=\"name\"\r\n\r\n",
            "Capacete\r\n",
            "--limite\r\n",
            "Content-Disposition: form-data; name=\"lifespan\"\r\n\r\n",
            "12\r\n",
            "--limite\r\n",
            "Content-Disposition: form-data; name=\"hasUvProtection\"\r\n\r\n",
            "true\r\n",
            "--limite--\r\n",
        );

        let multipart = multipart_de(body).await;
        let (payload, image) = parse_form::<FormularioDeTeste>(multipart).await.unwrap();

        assert_eq!(payload.name, "Capacete");
        assert_eq!(payload.lifespan, Some(12));
        assert!(payload.has_uv_protection);
        assert!(image.is_none());
    }

    #[tokio::test]
    async fn string_vazia_em_campo_numerico_vira_none() {
        let body = concat!(
            "--limite\r\n",
            "Content-Disposition: form-data; name=\"name\"\r\n\r\n",
            "Luva\r\n",
            "--limite\r\n",
            "Content-Disposition: form-data; name=\"lifespan\"\r\n\r\n",
            "\r\n",
            "--limite--\r\n",
        );

        let multipart = multipart_de(body).await;
        let (payload, _) = parse_form::<FormularioDeTeste>(multipart).await.unwrap();

        assert_eq!(payload.lifespan, None);
        assert!(!payload.has_uv_protection);
    }

    #[tokio::test]
    async fn parte_de_arquivo_e_separada_do_payload() {
        let body = concat!(
            "--limite\r\n",
            "Content-Disposition: form-data; name=\"name\"\r\n\r\n",
            "Bota\r\n",
            "--limite\r\n",
            "Content-Disposition: form-data; name=\"image\"; filename=\"foto.png\"\r\n",
            "Content-Type: image/png\r\n\r\n",
            "bytes-da-imagem\r\n",
            "--limite--\r\n",
        );

        let multipart = multipart_de(body).await;
        let (payload, image) = parse_form::<FormularioDeTeste>(multipart).await.unwrap();

        assert_eq!(payload.name, "Bota");

        let image = image.expect("deveria capturar o arquivo");
        assert_eq!(image.filename, "foto.png");
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.bytes, b"bytes-da-imagem");
    }

    #[tokio::test]
    async fn campo_image_sem_filename_e_texto_comum() {
        #[derive(Debug, Deserialize)]
        struct ComImagem {
            name: String,
            #[serde(default, deserialize_with = "normalize::opt_image_flex")]
            image: Option<String>,
        }

        let body = concat!(
            "--limite\r\n",
            "Content-Disposition: form-data; name=\"name\"\r\n\r\n",
            "Oculos\r\n",
            "--limite\r\n",
            "Content-Disposition: form-data; name=\"image\"\r\n\r\n",
            "\r\n",
            "--limite--\r\n",
        );

        let multipart = multipart_de(body).await;
        let (payload, image) = parse_form::<ComImagem>(multipart).await.unwrap();

        assert_eq!(payload.name, "Oculos");
        assert_eq!(payload.image, None);
        assert!(image.is_none());
    }

    #[tokio::test]
    async fn campo_obrigatorio_ausente_vira_invalid_form() {
        let body = concat!(
            "--limite\r\n",
            "Content-Disposition: form-data; name=\"lifespan\"\r\n\r\n",
            "3\r\n",
            "--limite--\r\n",
        );

        let multipart = multipart_de(body).await;
        let result = parse_form::<FormularioDeTeste>(multipart).await;

        assert!(matches!(result, Err(AppError::InvalidForm(_))));
    }
}
