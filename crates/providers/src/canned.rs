//! Deterministic last-resort responder.
//!
//! Classifies the query by keyword and returns a fixed, context-free reply
//! in the query's language. Never fails and never returns an empty string.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use lq_domain::intent::normalize;

/// Queries shorter than this (after normalization) are too short to answer.
const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CannedKind {
    Greeting,
    Help,
    Thanks,
    Farewell,
    HowAreYou,
    TooShort,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lang {
    En,
    Es,
}

struct CannedPatterns {
    how_are_you: Regex,
    thanks: Regex,
    farewell: Regex,
    help: Regex,
    greeting: Regex,
    spanish: Regex,
}

fn patterns() -> &'static CannedPatterns {
    static PATTERNS: OnceLock<CannedPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let compile = |p: &str| Regex::new(p).expect("canned pattern must compile");
        CannedPatterns {
            how_are_you: compile(r"\b(how are you|how's it going|como estas|como esta|que tal|como te va)\b"),
            thanks: compile(r"\b(thanks|thank you|thx|gracias|muchas gracias|te agradezco)\b"),
            farewell: compile(r"\b(bye|goodbye|see you|adios|hasta luego|hasta pronto|chao|nos vemos)\b"),
            help: compile(r"\b(help|ayuda|ayudame|what can you do|que puedes hacer|como funciona)\b"),
            greeting: compile(
                r"\b(hi|hello|hey|hola|buenos dias|buenas tardes|buenas noches|buenas|good morning|good afternoon|good evening|saludos)\b",
            ),
            spanish: compile(
                r"\b(hola|gracias|adios|ayuda|ayudame|como|que|cuantos?|cuantas?|buenos|buenas|hasta|por favor|estas|tengo|quiero|puedes|usuarios?|cursos?|tareas?)\b",
            ),
        }
    })
}

pub struct CannedResponder;

impl CannedResponder {
    pub fn classify(query: &str) -> CannedKind {
        let q = normalize(query);
        let meaningful = q.chars().filter(|c| c.is_alphanumeric()).count();
        if meaningful < MIN_QUERY_CHARS {
            return CannedKind::TooShort;
        }

        let p = patterns();
        if p.how_are_you.is_match(&q) {
            CannedKind::HowAreYou
        } else if p.thanks.is_match(&q) {
            CannedKind::Thanks
        } else if p.farewell.is_match(&q) {
            CannedKind::Farewell
        } else if p.help.is_match(&q) {
            CannedKind::Help
        } else if p.greeting.is_match(&q) {
            CannedKind::Greeting
        } else {
            CannedKind::Other
        }
    }

    /// A fixed reply for `query`. Always non-empty.
    pub fn respond(query: &str) -> String {
        let kind = Self::classify(query);
        Self::reply(kind, detect_lang(query)).to_string()
    }

    fn reply(kind: CannedKind, lang: Lang) -> &'static str {
        match (kind, lang) {
            (CannedKind::Greeting, Lang::Es) => {
                "¡Hola! Soy el asistente de la plataforma. Ahora mismo no puedo consultar \
                 el modelo, pero puedes preguntarme por tus cursos, tareas o usuarios más tarde."
            }
            (CannedKind::Greeting, Lang::En) => {
                "Hello! I'm the platform assistant. I can't reach the language model right \
                 now, but you can ask me about your courses, tasks or users a bit later."
            }
            (CannedKind::Help, Lang::Es) => {
                "Puedo responder preguntas sobre los datos de la plataforma: usuarios, temas, \
                 contenidos, tareas, entregas, suscripciones y compras. El modelo no está \
                 disponible en este momento; inténtalo de nuevo en unos minutos."
            }
            (CannedKind::Help, Lang::En) => {
                "I can answer questions about the platform data: users, topics, contents, \
                 tasks, submissions, subscriptions and purchases. The model is unavailable \
                 right now; please try again in a few minutes."
            }
            (CannedKind::Thanks, Lang::Es) => "¡De nada! Aquí estaré si necesitas algo más.",
            (CannedKind::Thanks, Lang::En) => "You're welcome! I'm here if you need anything else.",
            (CannedKind::Farewell, Lang::Es) => "¡Hasta luego! Que te vaya bien con tus estudios.",
            (CannedKind::Farewell, Lang::En) => "Goodbye! Good luck with your studies.",
            (CannedKind::HowAreYou, Lang::Es) => {
                "¡Bien, gracias por preguntar! Estoy funcionando en modo limitado porque el \
                 modelo no responde, pero sigo aquí."
            }
            (CannedKind::HowAreYou, Lang::En) => {
                "Doing fine, thanks for asking! I'm running in a limited mode because the \
                 model isn't responding, but I'm still here."
            }
            (CannedKind::TooShort, Lang::Es) => {
                "Tu pregunta es demasiado corta. ¿Puedes darme un poco más de detalle?"
            }
            (CannedKind::TooShort, Lang::En) => {
                "Your question is too short. Could you give me a bit more detail?"
            }
            (CannedKind::Other, Lang::Es) => {
                "Lo siento, ahora mismo no puedo procesar tu pregunta porque el modelo no \
                 está disponible. Inténtalo de nuevo más tarde."
            }
            (CannedKind::Other, Lang::En) => {
                "Sorry, I can't process your question right now because the model is \
                 unavailable. Please try again later."
            }
        }
    }
}

fn detect_lang(query: &str) -> Lang {
    let has_spanish_marks = query
        .chars()
        .any(|c| matches!(c, 'ñ' | 'Ñ' | '¿' | '¡' | 'á' | 'é' | 'í' | 'ó' | 'ú'));
    if has_spanish_marks || patterns().spanish.is_match(&normalize(query)) {
        Lang::Es
    } else {
        Lang::En
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_each_kind() {
        assert_eq!(CannedResponder::classify("Hola"), CannedKind::Greeting);
        assert_eq!(CannedResponder::classify("hello"), CannedKind::Greeting);
        assert_eq!(CannedResponder::classify("¿Cómo estás?"), CannedKind::HowAreYou);
        assert_eq!(CannedResponder::classify("muchas gracias"), CannedKind::Thanks);
        assert_eq!(CannedResponder::classify("bye!"), CannedKind::Farewell);
        assert_eq!(CannedResponder::classify("help"), CannedKind::Help);
        assert_eq!(CannedResponder::classify("x"), CannedKind::TooShort);
        assert_eq!(CannedResponder::classify("   "), CannedKind::TooShort);
        assert_eq!(CannedResponder::classify("explain photosynthesis"), CannedKind::Other);
    }

    #[test]
    fn how_are_you_wins_over_greeting() {
        assert_eq!(CannedResponder::classify("hola, ¿qué tal?"), CannedKind::HowAreYou);
    }

    #[test]
    fn reply_language_follows_query() {
        assert!(CannedResponder::respond("Hola").starts_with("¡Hola!"));
        assert!(CannedResponder::respond("hello").starts_with("Hello!"));
        assert!(CannedResponder::respond("gracias").starts_with("¡De nada!"));
    }

    #[test]
    fn every_reply_is_non_empty() {
        for query in ["", "?", "hola", "thanks", "adios", "ayuda", "how are you", "qwerty uiop"] {
            assert!(!CannedResponder::respond(query).trim().is_empty(), "empty reply for {query:?}");
        }
    }
}
