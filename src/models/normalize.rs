// src/models/normalize.rs

// Normalização de fronteira dos payloads. Os formulários do frontend enviam
// todo campo como texto, então os campos numéricos e booleanos aceitam tanto
// o tipo nativo quanto a forma em string ("12", "true", ""). As regras:
//
//   inteiro opcional:  12 | "12" -> 12; "" -> ausente
//   inteiro:           12 | "12" -> 12
//   decimal opcional:  10.5 | "10.5" -> 10.5; "" -> 0
//   booleano:          true | "true" -> true; qualquer outra string -> false
//   texto:             aparado (trim); string vazia continua vazia
//   imagem (string):   "" -> ausente

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolOrString {
    Bool(bool),
    Text(String),
}

pub fn opt_int_flex<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<IntOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_int(raw).map(Some).or_else(|e| {
            if is_empty(&e) { Ok(None) } else { Err(e.into_err::<D>()) }
        }),
    }
}

pub fn int_flex<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    parse_int(IntOrString::deserialize(deserializer)?).map_err(|e| e.into_err::<D>())
}

pub fn opt_decimal_flex<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_decimal(raw).map(Some).or_else(|e| {
            // String vazia no campo de valor significa "zero", não "ausente"
            if is_empty(&e) {
                Ok(Some(Decimal::ZERO))
            } else {
                Err(e.into_err::<D>())
            }
        }),
    }
}

pub fn bool_flex<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => b,
        BoolOrString::Text(s) => s == "true",
    })
}

pub fn opt_bool_flex<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<BoolOrString>::deserialize(deserializer)? {
        None => None,
        Some(BoolOrString::Bool(b)) => Some(b),
        Some(BoolOrString::Text(s)) => Some(s == "true"),
    })
}

pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(String::deserialize(deserializer)?.trim().to_string())
}

pub fn opt_trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(|s| s.trim().to_string()))
}

// Campo de imagem em forma de string: URL já resolvida passa adiante,
// string vazia vira ausência.
pub fn opt_image_flex<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.is_empty()))
}

// Erro intermediário dos parsers: distingue "campo veio vazio" (que alguns
// chamadores tratam como ausência ou zero) de texto realmente inválido.
enum ParseFailure {
    Empty,
    Invalid(String),
}

impl ParseFailure {
    fn into_err<'de, D>(self) -> D::Error
    where
        D: Deserializer<'de>,
    {
        match self {
            ParseFailure::Empty => serde::de::Error::custom("valor numérico vazio"),
            ParseFailure::Invalid(s) => {
                serde::de::Error::custom(format!("valor numérico inválido: \"{}\"", s))
            }
        }
    }
}

fn is_empty(failure: &ParseFailure) -> bool {
    matches!(failure, ParseFailure::Empty)
}

fn parse_int(raw: IntOrString) -> Result<i64, ParseFailure> {
    match raw {
        IntOrString::Int(n) => Ok(n),
        IntOrString::Text(s) => {
            let t = s.trim();
            if t.is_empty() {
                Err(ParseFailure::Empty)
            } else {
                t.parse::<i64>().map_err(|_| ParseFailure::Invalid(t.to_string()))
            }
        }
    }
}

fn parse_decimal(raw: NumberOrString) -> Result<Decimal, ParseFailure> {
    match raw {
        NumberOrString::Number(n) => {
            Decimal::try_from(n).map_err(|_| ParseFailure::Invalid(n.to_string()))
        }
        NumberOrString::Text(s) => {
            let t = s.trim();
            if t.is_empty() {
                Err(ParseFailure::Empty)
            } else {
                t.parse::<Decimal>()
                    .map_err(|_| ParseFailure::Invalid(t.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "super::opt_int_flex")]
        lifespan: Option<i64>,
        #[serde(default, deserialize_with = "super::bool_flex")]
        has_uv_protection: bool,
        #[serde(default, deserialize_with = "super::opt_decimal_flex")]
        value: Option<Decimal>,
    }

    #[test]
    fn inteiro_aceita_numero_e_string() {
        let p: Probe = serde_json::from_value(json!({ "lifespan": 12 })).unwrap();
        assert_eq!(p.lifespan, Some(12));

        let p: Probe = serde_json::from_value(json!({ "lifespan": "12" })).unwrap();
        assert_eq!(p.lifespan, Some(12));
    }

    #[test]
    fn inteiro_com_string_vazia_vira_ausente() {
        let p: Probe = serde_json::from_value(json!({ "lifespan": "" })).unwrap();
        assert_eq!(p.lifespan, None);

        let p: Probe = serde_json::from_value(json!({})).unwrap();
        assert_eq!(p.lifespan, None);
    }

    #[test]
    fn inteiro_com_texto_invalido_falha() {
        let result = serde_json::from_value::<Probe>(json!({ "lifespan": "abc" }));
        assert!(result.is_err());
    }

    #[test]
    fn booleano_aceita_nativo_e_literal_true() {
        let p: Probe = serde_json::from_value(json!({ "has_uv_protection": true })).unwrap();
        assert!(p.has_uv_protection);

        let p: Probe = serde_json::from_value(json!({ "has_uv_protection": "true" })).unwrap();
        assert!(p.has_uv_protection);
    }

    #[test]
    fn booleano_com_qualquer_outra_string_vira_false() {
        for raw in ["false", "1", "sim", ""] {
            let p: Probe =
                serde_json::from_value(json!({ "has_uv_protection": raw })).unwrap();
            assert!(!p.has_uv_protection, "{:?} deveria virar false", raw);
        }

        // Ausente também é false
        let p: Probe = serde_json::from_value(json!({})).unwrap();
        assert!(!p.has_uv_protection);
    }

    #[test]
    fn decimal_com_string_vazia_vira_zero() {
        let p: Probe = serde_json::from_value(json!({ "value": "" })).unwrap();
        assert_eq!(p.value, Some(Decimal::ZERO));

        let p: Probe = serde_json::from_value(json!({ "value": "10.50" })).unwrap();
        assert_eq!(p.value, Some("10.50".parse().unwrap()));

        let p: Probe = serde_json::from_value(json!({ "value": 7 })).unwrap();
        assert_eq!(p.value, Some(Decimal::from(7)));

        let p: Probe = serde_json::from_value(json!({})).unwrap();
        assert_eq!(p.value, None);
    }

    #[derive(Deserialize)]
    struct TextProbe {
        #[serde(deserialize_with = "super::trimmed")]
        name: String,
        #[serde(default, deserialize_with = "super::opt_image_flex")]
        image: Option<String>,
    }

    #[test]
    fn texto_e_aparado_e_imagem_vazia_vira_ausente() {
        let p: TextProbe =
            serde_json::from_value(json!({ "name": "  Capacete  ", "image": "" })).unwrap();
        assert_eq!(p.name, "Capacete");
        assert_eq!(p.image, None);

        let p: TextProbe =
            serde_json::from_value(json!({ "name": "Luva", "image": "https://cdn/x.png" }))
                .unwrap();
        assert_eq!(p.image.as_deref(), Some("https://cdn/x.png"));
    }
}
