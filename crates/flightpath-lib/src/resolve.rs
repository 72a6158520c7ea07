//! Turning user-supplied tokens into airport indices.

use crate::catalog::CatalogAirport;
use crate::error::{Error, Result};
use crate::graph::{Airport, AirportId, Graph};

/// Minimum Jaro-Winkler similarity for a code or name to be suggested.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Maximum number of suggestions attached to an unknown-airport error.
const MAX_SUGGESTIONS: usize = 3;

/// Anything that carries an airport code.
pub trait AirportCode {
    fn airport_code(&self) -> &str;

    /// Full name, when known. Used for suggestions only.
    fn airport_name(&self) -> &str {
        ""
    }
}

impl AirportCode for Airport {
    fn airport_code(&self) -> &str {
        &self.code
    }

    fn airport_name(&self) -> &str {
        &self.name
    }
}

impl AirportCode for CatalogAirport {
    fn airport_code(&self) -> &str {
        self.code
    }

    fn airport_name(&self) -> &str {
        self.name
    }
}

/// Resolve `token` to an index into `nodes`.
///
/// An all-digit token is parsed as an index and range-checked; anything else
/// must match a code exactly (case-sensitive). No fuzzy matching happens here.
pub fn resolve_index<T: AirportCode>(token: &str, nodes: &[T]) -> Option<AirportId> {
    if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
        return token
            .parse::<AirportId>()
            .ok()
            .filter(|&index| index < nodes.len());
    }
    nodes.iter().position(|node| node.airport_code() == token)
}

/// Resolve `token` against the airports of `graph`.
///
/// # Errors
///
/// Returns [`Error::UnknownAirport`] with up to three close codes when the
/// token does not resolve.
pub fn resolve_airport(graph: &Graph, token: &str) -> Result<AirportId> {
    resolve_index(token, graph.airports()).ok_or_else(|| Error::UnknownAirport {
        token: token.to_string(),
        suggestions: suggest_codes(graph.airports(), token),
    })
}

/// Codes whose code or name is close to `token`, best match first.
pub fn suggest_codes<T: AirportCode>(nodes: &[T], token: &str) -> Vec<String> {
    let needle = token.to_uppercase();
    let mut scored: Vec<(f64, &str)> = nodes
        .iter()
        .map(|node| {
            let by_code = strsim::jaro_winkler(&needle, node.airport_code());
            let by_name = strsim::jaro_winkler(&needle, &node.airport_name().to_uppercase());
            (by_code.max(by_name), node.airport_code())
        })
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, code)| code.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SIMULATION_AIRPORTS;

    #[test]
    fn digits_resolve_as_indices() {
        assert_eq!(resolve_index("2", &SIMULATION_AIRPORTS), Some(2));
        assert_eq!(resolve_index("0", &SIMULATION_AIRPORTS), Some(0));
        assert_eq!(resolve_index("20", &SIMULATION_AIRPORTS), None);
        assert_eq!(resolve_index("99999999999999999999999", &SIMULATION_AIRPORTS), None);
    }

    #[test]
    fn codes_match_exactly() {
        assert_eq!(resolve_index("LAX", &SIMULATION_AIRPORTS), Some(5));
        assert_eq!(resolve_index("lax", &SIMULATION_AIRPORTS), None);
        assert_eq!(resolve_index("", &SIMULATION_AIRPORTS), None);
        assert_eq!(resolve_index("-1", &SIMULATION_AIRPORTS), None);
    }

    #[test]
    fn near_miss_produces_suggestions() {
        let suggestions = suggest_codes(&SIMULATION_AIRPORTS, "SEX");
        assert_eq!(suggestions.first().map(String::as_str), Some("SEA"));
        assert!(suggestions.len() <= MAX_SUGGESTIONS);
    }
}
