use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create admins table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS admins (
            id UUID PRIMARY KEY,
            username VARCHAR(255) NOT NULL,
            password_hash VARCHAR(255) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT admins_username_key UNIQUE (username)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create patients table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS patients (
            id UUID PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            surname VARCHAR(255) NOT NULL,
            national_id VARCHAR(64) NOT NULL,
            age INTEGER NULL,
            height DOUBLE PRECISION NULL,
            weight DOUBLE PRECISION NULL,
            phone VARCHAR(64) NULL,
            email VARCHAR(255) NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL,
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL,
            CONSTRAINT patients_national_id_key UNIQUE (national_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create medical_notes table. `seq` orders notes written in the same instant.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS medical_notes (
            id UUID PRIMARY KEY,
            patient_id UUID NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
            content TEXT NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL,
            seq BIGSERIAL NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Databases created before `seq` existed
    sqlx::query("ALTER TABLE medical_notes ADD COLUMN IF NOT EXISTS seq BIGSERIAL NOT NULL")
        .execute(pool)
        .await?;

    // Create slots table. The assignment (asg_*) and reservation (res_*) columns
    // are both NULL when the slot has never been claimed.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS slots (
            id UUID PRIMARY KEY,
            starts_at TIMESTAMP WITH TIME ZONE NOT NULL,
            location VARCHAR(255) NOT NULL,
            available BOOLEAN NOT NULL DEFAULT TRUE,
            created_by UUID NOT NULL REFERENCES admins(id),
            asg_name VARCHAR(255) NULL,
            asg_surname VARCHAR(255) NULL,
            asg_is_recurrence BOOLEAN NULL,
            asg_origin_slot_id UUID NULL REFERENCES slots(id) ON DELETE SET NULL,
            res_name VARCHAR(255) NULL,
            res_surname VARCHAR(255) NULL,
            res_age INTEGER NULL,
            res_reason TEXT NULL,
            res_patient_id UUID NULL REFERENCES patients(id),
            res_status VARCHAR(16) NULL,
            res_admin_message TEXT NULL,
            res_booked_at TIMESTAMP WITH TIME ZONE NULL,
            res_decided_at TIMESTAMP WITH TIME ZONE NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL,
            CONSTRAINT valid_reservation_status
                CHECK (res_status IS NULL OR res_status IN ('pendiente', 'confirmada', 'rechazada')),
            CONSTRAINT claimed_slot_unavailable
                CHECK (NOT (available AND (asg_name IS NOT NULL OR res_status IN ('pendiente', 'confirmada')))),
            CONSTRAINT single_claim
                CHECK (NOT (asg_name IS NOT NULL AND res_status IN ('pendiente', 'confirmada')))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_slots_starts_at ON slots(starts_at)",
        "CREATE INDEX IF NOT EXISTS idx_slots_created_by ON slots(created_by)",
        "CREATE INDEX IF NOT EXISTS idx_slots_open ON slots(location, starts_at) WHERE available",
        "CREATE INDEX IF NOT EXISTS idx_slots_pending ON slots(res_booked_at) WHERE res_status = 'pendiente'",
        "CREATE INDEX IF NOT EXISTS idx_slots_res_patient_id ON slots(res_patient_id)",
        "CREATE INDEX IF NOT EXISTS idx_medical_notes_patient_order ON medical_notes(patient_id, created_at, seq)",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
