use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;

use super::commands::{IntakeEventsByLocationCommand, UpdateEventCommand};
use super::validator::IntakeValidator;

// ============================================================================
// Event Command Handler
// ============================================================================
//
// Handlers report business failure through their return value: `false` or a
// zero count. The registry turns those into errors.
//
// ============================================================================

#[async_trait]
pub trait EventCommandHandler: Send + Sync {
    /// Apply a partial update. Returns whether an event was changed.
    async fn update_event(&self, command: &UpdateEventCommand) -> Result<bool>;

    /// Store a tournament batch. Returns the number of events written.
    async fn intake_events_by_location(&self, command: &IntakeEventsByLocationCommand) -> Result<usize>;
}

pub struct PgEventCommandHandler {
    pool: PgPool,
    validator: IntakeValidator,
}

impl PgEventCommandHandler {
    pub fn new(pool: PgPool, validator: IntakeValidator) -> Self {
        Self { pool, validator }
    }
}

#[async_trait]
impl EventCommandHandler for PgEventCommandHandler {
    async fn update_event(&self, command: &UpdateEventCommand) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET event_name = COALESCE($2, event_name),
                event_description = COALESCE($3, event_description),
                start_time = COALESCE($4, start_time),
                end_time = COALESCE($5, end_time)
            WHERE link_id = $1
            "#,
        )
        .bind(command.link_id)
        .bind(command.event_name.as_deref())
        .bind(command.event_description.as_deref())
        .bind(command.start_time)
        .bind(command.end_time)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to update event {}", command.link_id))?;

        tracing::debug!(
            link_id = command.link_id,
            rows = result.rows_affected(),
            "Applied event update"
        );

        Ok(result.rows_affected() > 0)
    }

    async fn intake_events_by_location(&self, command: &IntakeEventsByLocationCommand) -> Result<usize> {
        self.validator.validate_command(command)?;

        let accepted = self.validator.accepted_events(&command.events);
        if accepted.is_empty() {
            tracing::warn!(
                state_code = %command.state_code,
                submitted = command.events.len(),
                "No valid events in intake batch"
            );
            return Ok(0);
        }

        // Requires a unique constraint on events.link_id.
        let mut tx = self.pool.begin().await.context("Failed to open intake transaction")?;

        for intake in &accepted {
            let (event, address) = intake.to_parts();

            let address_id: i32 = sqlx::query_scalar(
                r#"
                INSERT INTO addresses (address, latitude, longitude)
                VALUES ($1, $2, $3)
                RETURNING id
                "#,
            )
            .bind(&address.address)
            .bind(address.latitude)
            .bind(address.longitude)
            .fetch_one(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert address for event {}", event.link_id))?;

            sqlx::query(
                r#"
                INSERT INTO events (
                    region, address_id, event_name, event_description,
                    start_time, end_time, link_id
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (link_id) DO UPDATE SET
                    region = EXCLUDED.region,
                    address_id = EXCLUDED.address_id,
                    event_name = EXCLUDED.event_name,
                    event_description = EXCLUDED.event_description,
                    start_time = EXCLUDED.start_time,
                    end_time = EXCLUDED.end_time
                "#,
            )
            .bind(event.region)
            .bind(address_id)
            .bind(&event.name)
            .bind(&event.description)
            .bind(event.start_time)
            .bind(event.end_time)
            .bind(event.link_id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to upsert event {}", event.link_id))?;
        }

        tx.commit().await.context("Failed to commit intake batch")?;

        tracing::info!(
            state_code = %command.state_code,
            written = accepted.len(),
            skipped = command.events.len() - accepted.len(),
            "Ingested tournament batch"
        );

        Ok(accepted.len())
    }
}
