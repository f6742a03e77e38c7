//! Match commentary generation.
//!
//! Commentary is cosmetic: a provider failure never blocks a payout. Callers
//! go through [`commentary_or_fallback`], which substitutes one configured
//! line when the provider errors and another when it returns blank text.

use std::future::Future;

use proplay_types::Result;

/// Produces a short announcer-style line about a finished match.
pub trait CommentaryProvider {
    fn generate(
        &self,
        player_one: &str,
        player_two: &str,
        winner: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Offline provider with a fixed template.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCommentary;

impl CommentaryProvider for StaticCommentary {
    fn generate(
        &self,
        player_one: &str,
        player_two: &str,
        winner: &str,
    ) -> impl Future<Output = Result<String>> + Send {
        let line = format!(
            "{player_one} and {player_two} traded blows all the way to the final round! \
             In the end it was {winner} who took the crown."
        );
        async move { Ok(line) }
    }
}

/// Ask `provider` for commentary. Errors yield `on_error`, blank output
/// yields `on_empty`.
pub async fn commentary_or_fallback<C: CommentaryProvider>(
    provider: &C,
    player_one: &str,
    player_two: &str,
    winner: &str,
    on_error: &str,
    on_empty: &str,
) -> String {
    match provider.generate(player_one, player_two, winner).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            tracing::warn!(%winner, "Commentary came back empty, using default line");
            on_empty.to_string()
        }
        Err(e) => {
            tracing::warn!(error = %e, %winner, "Commentary failed, using fallback");
            on_error.to_string()
        }
    }
}
