//! Lightweight keyword-based intent tagging for user queries.
//!
//! The tag only steers response style (prompt hints, status shortcut); it is
//! never persisted. Keywords cover English and Spanish since the learning
//! platform serves both audiences.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    Greeting,
    Help,
    ContextQuery,
    ServerStatus,
    GraphQuery,
    GenericQuery,
}

struct IntentPatterns {
    server_status: Regex,
    graph: Regex,
    context: Regex,
    help: Regex,
    greeting: Regex,
}

fn patterns() -> &'static IntentPatterns {
    static PATTERNS: OnceLock<IntentPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        // Patterns are compile-time constants; a failure here is a programming error.
        let compile = |p: &str| Regex::new(p).expect("intent pattern must compile");
        IntentPatterns {
            // Whole phrases only: data questions often mention a server or a connection.
            server_status: compile(
                r"\b(server status|status of the server|is the server (up|down|online|running)|connection status|are you (online|connected)|estado del servidor|estado de (la )?conexion|esta el servidor (activo|encendido|en linea)|estas (conectad\w*|en linea))\b",
            ),
            graph: compile(r"\b(graph\w*|chart\w*|plot\w*|grafic\w*|diagram\w*|histogram\w*|visuali\w*)\b"),
            context: compile(
                r"\b(how many|cuant\w*|list\w*|usuarios?|users?|topics?|temas?|cursos?|courses?|tasks?|tareas?|subscri\w*|suscrip\w*|submissions?|entregas?|purchases?|compras?|media|videos?|profiles?|perfil\w*|records?|registros?|database|base de datos|datos|data)\b",
            ),
            help: compile(r"\b(help|ayuda|what can you do|que puedes hacer|how do i|como uso|commands|comandos)\b"),
            greeting: compile(
                r"\b(hi|hello|hey|hola|buenos dias|buenas tardes|buenas noches|good morning|good afternoon|good evening|saludos)\b",
            ),
        }
    })
}

/// Lowercase, fold Spanish diacritics and collapse whitespace.
pub fn normalize(query: &str) -> String {
    let folded: String = query
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            'ñ' => 'n',
            '¿' | '¡' => ' ',
            other => other,
        })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl QueryIntent {
    /// Classify a raw user query. Earlier checks win: a greeting that also
    /// asks about data is a context query.
    pub fn classify(query: &str) -> Self {
        let q = normalize(query);
        let p = patterns();
        if p.server_status.is_match(&q) {
            QueryIntent::ServerStatus
        } else if p.graph.is_match(&q) {
            QueryIntent::GraphQuery
        } else if p.context.is_match(&q) {
            QueryIntent::ContextQuery
        } else if p.help.is_match(&q) {
            QueryIntent::Help
        } else if p.greeting.is_match(&q) {
            QueryIntent::Greeting
        } else {
            QueryIntent::GenericQuery
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryIntent::Greeting => "greeting",
            QueryIntent::Help => "help",
            QueryIntent::ContextQuery => "context_query",
            QueryIntent::ServerStatus => "server_status",
            QueryIntent::GraphQuery => "graph_query",
            QueryIntent::GenericQuery => "generic_query",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_accents_and_whitespace() {
        assert_eq!(normalize("  ¿Cuántos   USUARIOS hay? "), "cuantos usuarios hay?");
    }

    #[test]
    fn greeting_in_both_languages() {
        assert_eq!(QueryIntent::classify("Hola"), QueryIntent::Greeting);
        assert_eq!(QueryIntent::classify("hello there"), QueryIntent::Greeting);
        assert_eq!(QueryIntent::classify("Buenos días"), QueryIntent::Greeting);
    }

    #[test]
    fn data_question_beats_greeting() {
        assert_eq!(
            QueryIntent::classify("Hola, ¿cuántos usuarios hay?"),
            QueryIntent::ContextQuery
        );
    }

    #[test]
    fn server_status_detected() {
        assert_eq!(QueryIntent::classify("server status"), QueryIntent::ServerStatus);
        assert_eq!(
            QueryIntent::classify("¿Cuál es el estado del servidor?"),
            QueryIntent::ServerStatus
        );
    }

    #[test]
    fn data_questions_mentioning_servers_are_not_status() {
        for q in [
            "How many users uploaded a video about the server course?",
            "¿Cuántos usuarios tienen problemas de conexión?",
            "list the tasks in the Ollama topic",
            "which endpoint topics have subscriptions",
        ] {
            assert_eq!(QueryIntent::classify(q), QueryIntent::ContextQuery, "{q}");
        }
        assert_eq!(QueryIntent::classify("is the server up?"), QueryIntent::ServerStatus);
        assert_eq!(QueryIntent::classify("¿Estás conectado?"), QueryIntent::ServerStatus);
    }

    #[test]
    fn graph_detected() {
        assert_eq!(
            QueryIntent::classify("show a chart of purchases per topic"),
            QueryIntent::GraphQuery
        );
        assert_eq!(QueryIntent::classify("haz una gráfica de compras"), QueryIntent::GraphQuery);
    }

    #[test]
    fn help_detected() {
        assert_eq!(QueryIntent::classify("help"), QueryIntent::Help);
        assert_eq!(QueryIntent::classify("¿Qué puedes hacer?"), QueryIntent::Help);
    }

    #[test]
    fn everything_else_is_generic() {
        assert_eq!(QueryIntent::classify("why is the sky blue"), QueryIntent::GenericQuery);
        assert_eq!(QueryIntent::classify(""), QueryIntent::GenericQuery);
    }

    #[test]
    fn keywords_match_whole_words_only() {
        // "this" contains "hi" but is not a greeting.
        assert_eq!(QueryIntent::classify("this is odd"), QueryIntent::GenericQuery);
    }
}
