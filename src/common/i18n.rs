// src/common/i18n.rs

use crate::middleware::i18n::Locale;

// Catálogo estático de mensagens de erro voltadas ao cliente.
// Português é o idioma padrão da aplicação; inglês é servido quando o
// Accept-Language do cliente preferir "en".
#[derive(Debug, Clone, Default)]
pub struct I18nStore;

impl I18nStore {
    pub fn new() -> Self {
        Self
    }

    // Resolve a mensagem para a chave no idioma pedido.
    // Idioma desconhecido cai no português; chave desconhecida volta como está
    // (aparece no payload e denuncia a chave faltante em vez de esconder).
    pub fn message(&self, locale: &Locale, key: &str) -> String {
        let lang = match locale.0.as_str() {
            "en" => "en",
            _ => "pt",
        };

        lookup(lang, key)
            .or_else(|| lookup("pt", key))
            .unwrap_or(key)
            .to_string()
    }
}

fn lookup(lang: &str, key: &str) -> Option<&'static str> {
    let msg = match (lang, key) {
        ("pt", "errors.validation") => "Um ou mais campos são inválidos.",
        ("en", "errors.validation") => "One or more fields are invalid.",

        ("pt", "errors.invalid_form") => "Não foi possível ler os dados do formulário.",
        ("en", "errors.invalid_form") => "Could not read the form data.",

        ("pt", "errors.email_in_use") => "Este e-mail já está em uso.",
        ("en", "errors.email_in_use") => "This email is already in use.",

        ("pt", "errors.invalid_credentials") => "E-mail ou senha inválidos.",
        ("en", "errors.invalid_credentials") => "Invalid email or password.",

        ("pt", "errors.invalid_token") => "Token de autenticação inválido ou ausente.",
        ("en", "errors.invalid_token") => "Invalid or missing authentication token.",

        // Mensagem curta, sem ponto final: é a resposta padrão dos guards de
        // workspace e o frontend a exibe como veio.
        ("pt", "errors.unauthorized") => "Não autorizado",
        ("en", "errors.unauthorized") => "Unauthorized",

        ("pt", "errors.not_found") => "Registro não encontrado.",
        ("en", "errors.not_found") => "Record not found.",

        ("pt", "errors.invalid_invite_code") => "Código de convite inválido.",
        ("en", "errors.invalid_invite_code") => "Invalid invite code.",

        ("pt", "errors.already_member") => "Você já é membro deste workspace.",
        ("en", "errors.already_member") => "You are already a member of this workspace.",

        ("pt", "errors.last_member") => {
            "O único membro do workspace não pode ser removido ou rebaixado."
        }
        ("en", "errors.last_member") => {
            "The only member of the workspace cannot be removed or demoted."
        }

        ("pt", "errors.storage") => "Falha ao comunicar com o serviço de armazenamento.",
        ("en", "errors.storage") => "Failed to reach the storage service.",

        ("pt", "errors.internal") => "Ocorreu um erro inesperado.",
        ("en", "errors.internal") => "An unexpected error occurred.",

        _ => return None,
    };

    Some(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locale(lang: &str) -> Locale {
        Locale(lang.to_string())
    }

    #[test]
    fn portugues_e_o_idioma_padrao() {
        let store = I18nStore::new();
        assert_eq!(
            store.message(&locale("pt"), "errors.unauthorized"),
            "Não autorizado"
        );
        // Idioma não suportado cai no português
        assert_eq!(
            store.message(&locale("de"), "errors.unauthorized"),
            "Não autorizado"
        );
    }

    #[test]
    fn ingles_quando_pedido() {
        let store = I18nStore::new();
        assert_eq!(
            store.message(&locale("en"), "errors.unauthorized"),
            "Unauthorized"
        );
        assert_eq!(
            store.message(&locale("en"), "errors.not_found"),
            "Record not found."
        );
    }

    #[test]
    fn chave_desconhecida_volta_como_esta() {
        let store = I18nStore::new();
        assert_eq!(store.message(&locale("pt"), "errors.nope"), "errors.nope");
    }
}
