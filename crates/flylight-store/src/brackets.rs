//! Tournament brackets. Match results are kept as an append-only JSON array.

use crate::error::StoreResult;
use crate::{Store, StoreError};
use chrono::{DateTime, Utc};
use flylight_core::Bracket;

#[derive(Debug, sqlx::FromRow)]
struct BracketRow {
    id: String,
    tournament_id: String,
    bracket_data: Option<String>,
    matches: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BracketRow> for Bracket {
    type Error = StoreError;

    fn try_from(row: BracketRow) -> Result<Self, Self::Error> {
        Ok(Bracket {
            id: row.id,
            tournament_id: row.tournament_id,
            bracket_data: row.bracket_data.as_deref().map(serde_json::from_str).transpose()?,
            matches: serde_json::from_str(&row.matches)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl Store {
    pub async fn insert_bracket(&self, bracket: &Bracket) -> StoreResult<()> {
        let bracket_data = bracket.bracket_data.as_ref().map(serde_json::to_string).transpose()?;
        sqlx::query(
            r#"INSERT INTO tournament_brackets
                (id, tournament_id, bracket_data, matches, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&bracket.id)
        .bind(&bracket.tournament_id)
        .bind(bracket_data)
        .bind(serde_json::to_string(&bracket.matches)?)
        .bind(bracket.created_at)
        .bind(bracket.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_bracket(&self, id: &str) -> StoreResult<Option<Bracket>> {
        sqlx::query_as::<_, BracketRow>("SELECT * FROM tournament_brackets WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Bracket::try_from)
            .transpose()
    }

    /// The earliest bracket created for a tournament
    pub async fn find_bracket_for_tournament(
        &self,
        tournament_id: &str,
    ) -> StoreResult<Option<Bracket>> {
        sqlx::query_as::<_, BracketRow>(
            "SELECT * FROM tournament_brackets WHERE tournament_id = ? ORDER BY rowid LIMIT 1",
        )
        .bind(tournament_id)
        .fetch_optional(&self.pool)
        .await?
        .map(Bracket::try_from)
        .transpose()
    }

    pub async fn update_bracket_matches(&self, bracket: &Bracket) -> StoreResult<()> {
        sqlx::query("UPDATE tournament_brackets SET matches = ?, updated_at = ? WHERE id = ?")
            .bind(serde_json::to_string(&bracket.matches)?)
            .bind(bracket.updated_at)
            .bind(&bracket.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
