//! Tournaments, their events and registrations.

use crate::error::{StoreError, StoreResult};
use crate::Store;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use flylight_core::{Registration, RegistrationStatus, Tournament, TournamentEvent};

#[derive(Debug, sqlx::FromRow)]
struct TournamentRow {
    id: String,
    name: String,
    description: Option<String>,
    venue: String,
    poster_url: Option<String>,
    gmaps_link: Option<String>,
    start_date: NaiveDate,
    start_time: NaiveTime,
    end_date: NaiveDate,
    end_time: NaiveTime,
    price: f64,
    status: String,
    capacity: i64,
    created_by: Option<String>,
    accept_entries: bool,
    bracket_data: Option<String>,
    status_override: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TournamentRow> for Tournament {
    type Error = StoreError;

    fn try_from(row: TournamentRow) -> Result<Self, Self::Error> {
        let bracket_data = row
            .bracket_data
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(Tournament {
            id: row.id,
            name: row.name,
            description: row.description,
            venue: row.venue,
            poster_url: row.poster_url,
            gmaps_link: row.gmaps_link,
            start_date: row.start_date,
            start_time: row.start_time,
            end_date: row.end_date,
            end_time: row.end_time,
            price: row.price,
            status: row.status,
            capacity: row.capacity,
            created_by: row.created_by,
            accept_entries: row.accept_entries,
            bracket_data,
            status_override: row.status_override,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RegistrationRow {
    id: String,
    tournament_id: String,
    participant_name: String,
    phone: String,
    email: String,
    academy_name: Option<String>,
    selected_venue: Option<String>,
    payment_id: Option<String>,
    status: String,
    joined_at: DateTime<Utc>,
}

impl TryFrom<RegistrationRow> for Registration {
    type Error = StoreError;

    fn try_from(row: RegistrationRow) -> Result<Self, Self::Error> {
        let status = RegistrationStatus::parse(&row.status).ok_or_else(|| {
            StoreError::corrupt("tournament_registrations", format!("status '{}'", row.status))
        })?;

        Ok(Registration {
            id: row.id,
            tournament_id: row.tournament_id,
            participant_name: row.participant_name,
            phone: row.phone,
            email: row.email,
            academy_name: row.academy_name,
            selected_venue: row.selected_venue,
            payment_id: row.payment_id,
            status,
            joined_at: row.joined_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: String,
    tournament_id: String,
    name: String,
    category: Option<String>,
    entry_fee: f64,
    max_participants: i64,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<EventRow> for TournamentEvent {
    fn from(row: EventRow) -> Self {
        TournamentEvent {
            id: row.id,
            tournament_id: row.tournament_id,
            name: row.name,
            category: row.category,
            entry_fee: row.entry_fee,
            max_participants: row.max_participants,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

fn encode_json(value: &Option<serde_json::Value>) -> StoreResult<Option<String>> {
    Ok(value.as_ref().map(serde_json::to_string).transpose()?)
}

impl Store {
    pub async fn insert_tournament(&self, t: &Tournament) -> StoreResult<()> {
        sqlx::query(
            r#"INSERT INTO tournaments (
                id, name, description, venue, poster_url, gmaps_link,
                start_date, start_time, end_date, end_time, price, status,
                capacity, created_by, accept_entries, bracket_data,
                status_override, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&t.id)
        .bind(&t.name)
        .bind(&t.description)
        .bind(&t.venue)
        .bind(&t.poster_url)
        .bind(&t.gmaps_link)
        .bind(t.start_date)
        .bind(t.start_time)
        .bind(t.end_date)
        .bind(t.end_time)
        .bind(t.price)
        .bind(&t.status)
        .bind(t.capacity)
        .bind(&t.created_by)
        .bind(t.accept_entries)
        .bind(encode_json(&t.bracket_data)?)
        .bind(&t.status_override)
        .bind(t.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Overwrite every mutable column of an existing tournament
    pub async fn update_tournament(&self, t: &Tournament) -> StoreResult<()> {
        sqlx::query(
            r#"UPDATE tournaments SET
                name = ?, description = ?, venue = ?, poster_url = ?, gmaps_link = ?,
                start_date = ?, start_time = ?, end_date = ?, end_time = ?,
                price = ?, status = ?, capacity = ?, accept_entries = ?,
                bracket_data = ?, status_override = ?
            WHERE id = ?"#,
        )
        .bind(&t.name)
        .bind(&t.description)
        .bind(&t.venue)
        .bind(&t.poster_url)
        .bind(&t.gmaps_link)
        .bind(t.start_date)
        .bind(t.start_time)
        .bind(t.end_date)
        .bind(t.end_time)
        .bind(t.price)
        .bind(&t.status)
        .bind(t.capacity)
        .bind(t.accept_entries)
        .bind(encode_json(&t.bracket_data)?)
        .bind(&t.status_override)
        .bind(&t.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Returns false when no such tournament existed. Events, registrations
    /// and brackets go with it.
    pub async fn delete_tournament(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tournaments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_tournament(&self, id: &str) -> StoreResult<Option<Tournament>> {
        sqlx::query_as::<_, TournamentRow>("SELECT * FROM tournaments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Tournament::try_from)
            .transpose()
    }

    pub async fn list_tournaments(&self) -> StoreResult<Vec<Tournament>> {
        sqlx::query_as::<_, TournamentRow>("SELECT * FROM tournaments ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Tournament::try_from)
            .collect()
    }

    pub async fn list_tournaments_by_creator(&self, user_id: &str) -> StoreResult<Vec<Tournament>> {
        sqlx::query_as::<_, TournamentRow>(
            "SELECT * FROM tournaments WHERE created_by = ? ORDER BY rowid",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Tournament::try_from)
        .collect()
    }

    // ---- registrations ----

    pub async fn insert_registration(&self, r: &Registration) -> StoreResult<()> {
        sqlx::query(
            r#"INSERT INTO tournament_registrations (
                id, tournament_id, participant_name, phone, email,
                academy_name, selected_venue, payment_id, status, joined_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&r.id)
        .bind(&r.tournament_id)
        .bind(&r.participant_name)
        .bind(&r.phone)
        .bind(&r.email)
        .bind(&r.academy_name)
        .bind(&r.selected_venue)
        .bind(&r.payment_id)
        .bind(r.status.as_str())
        .bind(r.joined_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_registrations(&self, tournament_id: &str) -> StoreResult<Vec<Registration>> {
        sqlx::query_as::<_, RegistrationRow>(
            r#"SELECT * FROM tournament_registrations
            WHERE tournament_id = ?
            ORDER BY joined_at, rowid"#,
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Registration::try_from)
        .collect()
    }

    // ---- events ----

    pub async fn insert_event(&self, e: &TournamentEvent) -> StoreResult<()> {
        sqlx::query(
            r#"INSERT INTO tournament_events (
                id, tournament_id, name, category, entry_fee,
                max_participants, description, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&e.id)
        .bind(&e.tournament_id)
        .bind(&e.name)
        .bind(&e.category)
        .bind(e.entry_fee)
        .bind(e.max_participants)
        .bind(&e.description)
        .bind(e.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_event(&self, e: &TournamentEvent) -> StoreResult<()> {
        sqlx::query(
            r#"UPDATE tournament_events SET
                name = ?, category = ?, entry_fee = ?, max_participants = ?, description = ?
            WHERE id = ?"#,
        )
        .bind(&e.name)
        .bind(&e.category)
        .bind(e.entry_fee)
        .bind(e.max_participants)
        .bind(&e.description)
        .bind(&e.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_event(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tournament_events WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_event(&self, id: &str) -> StoreResult<Option<TournamentEvent>> {
        Ok(
            sqlx::query_as::<_, EventRow>("SELECT * FROM tournament_events WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .map(TournamentEvent::from),
        )
    }

    pub async fn list_events(&self, tournament_id: &str) -> StoreResult<Vec<TournamentEvent>> {
        Ok(sqlx::query_as::<_, EventRow>(
            "SELECT * FROM tournament_events WHERE tournament_id = ? ORDER BY rowid",
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(TournamentEvent::from)
        .collect())
    }
}
