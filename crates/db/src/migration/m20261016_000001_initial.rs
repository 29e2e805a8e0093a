//! Initial database migration.
//!
//! Creates the enums, facility and member tables, bookings with their unit
//! and slot claims, availability blockers, payment vouchers, and triggers.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: MEMBERS & FACILITIES
        // ============================================================
        db.execute_unprepared(MEMBERS_SQL).await?;
        db.execute_unprepared(FACILITY_UNITS_SQL).await?;

        // ============================================================
        // PART 3: BOOKINGS
        // ============================================================
        db.execute_unprepared(BOOKINGS_SQL).await?;
        db.execute_unprepared(BOOKING_UNITS_SQL).await?;
        db.execute_unprepared(BOOKING_CLAIMS_SQL).await?;

        // ============================================================
        // PART 4: AVAILABILITY BLOCKERS
        // ============================================================
        db.execute_unprepared(RESERVATIONS_SQL).await?;
        db.execute_unprepared(HOLDS_SQL).await?;
        db.execute_unprepared(OUT_OF_ORDER_SQL).await?;

        // ============================================================
        // PART 5: PAYMENT VOUCHERS
        // ============================================================
        db.execute_unprepared(PAYMENT_VOUCHERS_SQL).await?;

        // ============================================================
        // PART 6: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE facility_type AS ENUM ('room', 'hall', 'lawn', 'photoshoot');

CREATE TYPE pricing_type AS ENUM (
    'member',
    'guest',
    'forces',
    'forces-self',
    'forces-guest',
    'corporate'
);

CREATE TYPE payment_status AS ENUM ('UNPAID', 'HALF_PAID', 'PAID', 'TO_BILL');

CREATE TYPE voucher_type AS ENUM (
    'FULL_PAYMENT',
    'HALF_PAYMENT',
    'ADVANCE_PAYMENT',
    'REFUND',
    'ADJUSTMENT',
    'TO_BILL'
);

CREATE TYPE voucher_status AS ENUM ('PENDING', 'CONFIRMED', 'CANCELLED');

CREATE TYPE payment_mode AS ENUM ('CASH', 'CARD', 'CHEQUE', 'ONLINE');

CREATE TYPE payer_role AS ENUM ('MEMBER', 'GUEST');
";

const MEMBERS_SQL: &str = r"
CREATE TABLE members (
    id                  UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    membership_no       VARCHAR(32) NOT NULL UNIQUE,
    name                VARCHAR(255) NOT NULL,
    email               VARCHAR(255),
    phone               VARCHAR(32),
    is_active           BOOLEAN NOT NULL DEFAULT true,

    -- Booking ledger
    booking_amount_paid NUMERIC(15, 2) NOT NULL DEFAULT 0,
    booking_amount_due  NUMERIC(15, 2) NOT NULL DEFAULT 0,
    booking_balance     NUMERIC(15, 2) NOT NULL DEFAULT 0,

    -- Club account
    account_balance     NUMERIC(15, 2) NOT NULL DEFAULT 0,
    dr_amount           NUMERIC(15, 2) NOT NULL DEFAULT 0,

    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const FACILITY_UNITS_SQL: &str = r"
CREATE TABLE facility_units (
    id              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    facility_type   facility_type NOT NULL,
    name            VARCHAR(100) NOT NULL,
    member_rate     NUMERIC(15, 2) NOT NULL,
    guest_rate      NUMERIC(15, 2) NOT NULL,
    forces_rate     NUMERIC(15, 2),
    corporate_rate  NUMERIC(15, 2),
    capacity        INTEGER,
    is_active       BOOLEAN NOT NULL DEFAULT true,
    is_booked       BOOLEAN NOT NULL DEFAULT false,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_facility_units_name UNIQUE (facility_type, name),
    CONSTRAINT chk_facility_units_rates CHECK (
        member_rate >= 0 AND guest_rate >= 0
        AND COALESCE(forces_rate, 0) >= 0
        AND COALESCE(corporate_rate, 0) >= 0
    ),
    CONSTRAINT chk_facility_units_capacity CHECK (capacity IS NULL OR capacity > 0)
);
";

const BOOKINGS_SQL: &str = r"
CREATE TABLE bookings (
    id              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    facility_type   facility_type NOT NULL,
    member_id       UUID NOT NULL REFERENCES members(id),
    start_date      DATE NOT NULL,
    end_date        DATE NOT NULL,
    time_slot       VARCHAR(16),
    start_time      TIME,
    slot_details    JSONB NOT NULL DEFAULT '[]',
    pricing_type    pricing_type NOT NULL,
    total_price     NUMERIC(15, 2) NOT NULL,
    paid_amount     NUMERIC(15, 2) NOT NULL DEFAULT 0,
    pending_amount  NUMERIC(15, 2) NOT NULL DEFAULT 0,
    payment_status  payment_status NOT NULL DEFAULT 'UNPAID',
    payment_mode    payment_mode NOT NULL DEFAULT 'CASH',
    payer_role      payer_role NOT NULL DEFAULT 'MEMBER',
    guest_name      VARCHAR(255),
    guest_contact   VARCHAR(64),
    occupants       INTEGER NOT NULL DEFAULT 1,
    refund_amount   NUMERIC(15, 2) NOT NULL DEFAULT 0,
    remarks         TEXT,
    is_cancelled    BOOLEAN NOT NULL DEFAULT false,
    created_by      VARCHAR(255) NOT NULL,
    updated_by      VARCHAR(255) NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_bookings_dates CHECK (end_date >= start_date),
    CONSTRAINT chk_bookings_amounts CHECK (
        total_price >= 0 AND paid_amount >= 0 AND pending_amount >= 0
        AND refund_amount >= 0 AND paid_amount <= total_price
    ),
    CONSTRAINT chk_bookings_split CHECK (
        (payment_status = 'TO_BILL' AND pending_amount = 0)
        OR (payment_status <> 'TO_BILL' AND paid_amount + pending_amount = total_price)
    ),
    CONSTRAINT chk_bookings_occupants CHECK (occupants > 0)
);

CREATE INDEX idx_bookings_facility_created
    ON bookings(facility_type, created_at DESC);
CREATE INDEX idx_bookings_member ON bookings(member_id);
";

const BOOKING_UNITS_SQL: &str = r"
CREATE TABLE booking_units (
    booking_id  UUID NOT NULL REFERENCES bookings(id) ON DELETE CASCADE,
    unit_id     UUID NOT NULL REFERENCES facility_units(id),
    position    INTEGER NOT NULL DEFAULT 0,

    PRIMARY KEY (booking_id, unit_id)
);

CREATE INDEX idx_booking_units_unit ON booking_units(unit_id);
";

const BOOKING_CLAIMS_SQL: &str = r"
CREATE TABLE booking_claims (
    id          UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    booking_id  UUID NOT NULL REFERENCES bookings(id) ON DELETE CASCADE,
    unit_id     UUID NOT NULL REFERENCES facility_units(id),
    claim_date  DATE NOT NULL,
    slot        VARCHAR(16) NOT NULL,
    is_active   BOOLEAN NOT NULL DEFAULT true,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- A unit is only ever booked with one kind of slot (full days for rooms,
-- sessions for halls and lawns, grid blocks for the studio), so equality on
-- the slot key is exact collision detection.
CREATE UNIQUE INDEX uq_booking_claims_active
    ON booking_claims(unit_id, claim_date, slot)
    WHERE is_active;

CREATE INDEX idx_booking_claims_booking ON booking_claims(booking_id);
CREATE INDEX idx_booking_claims_unit_date ON booking_claims(unit_id, claim_date);
";

const RESERVATIONS_SQL: &str = r"
CREATE TABLE reservations (
    id          UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    unit_id     UUID NOT NULL REFERENCES facility_units(id),
    start_date  DATE NOT NULL,
    end_date    DATE NOT NULL,
    claims      JSONB NOT NULL DEFAULT '[]',
    remarks     TEXT,
    created_by  VARCHAR(255) NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_reservations_dates CHECK (end_date >= start_date)
);

CREATE INDEX idx_reservations_unit_dates ON reservations(unit_id, start_date, end_date);
";

const HOLDS_SQL: &str = r"
CREATE TABLE holds (
    id          UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    unit_id     UUID NOT NULL REFERENCES facility_units(id),
    member_id   UUID NOT NULL REFERENCES members(id),
    start_date  DATE NOT NULL,
    end_date    DATE NOT NULL,
    claims      JSONB NOT NULL DEFAULT '[]',
    expires_at  TIMESTAMPTZ NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_holds_dates CHECK (end_date >= start_date)
);

CREATE INDEX idx_holds_unit_dates ON holds(unit_id, start_date, end_date);
CREATE INDEX idx_holds_expires ON holds(expires_at);
";

const OUT_OF_ORDER_SQL: &str = r"
CREATE TABLE out_of_order_periods (
    id          UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    unit_id     UUID NOT NULL REFERENCES facility_units(id),
    start_date  DATE NOT NULL,
    end_date    DATE NOT NULL,
    reason      TEXT NOT NULL,
    created_by  VARCHAR(255) NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_out_of_order_dates CHECK (end_date >= start_date),
    CONSTRAINT chk_out_of_order_reason CHECK (length(trim(reason)) > 0)
);

CREATE INDEX idx_out_of_order_unit_dates
    ON out_of_order_periods(unit_id, start_date, end_date);
";

const PAYMENT_VOUCHERS_SQL: &str = r"
CREATE TABLE payment_vouchers (
    id              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    booking_id      UUID NOT NULL REFERENCES bookings(id),
    facility_type   facility_type NOT NULL,
    voucher_number  VARCHAR(32) NOT NULL UNIQUE,
    voucher_type    voucher_type NOT NULL,
    status          voucher_status NOT NULL DEFAULT 'PENDING',
    amount          NUMERIC(15, 2) NOT NULL,
    payment_mode    payment_mode NOT NULL DEFAULT 'CASH',
    remarks         TEXT NOT NULL,
    issued_by       VARCHAR(255) NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_payment_vouchers_amount CHECK (amount > 0)
);

CREATE INDEX idx_payment_vouchers_booking ON payment_vouchers(booking_id, created_at);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: set_updated_at
-- Keeps updated_at current on every row update
-- ============================================================
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = NOW();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_members_updated_at
BEFORE UPDATE ON members
FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_facility_units_updated_at
BEFORE UPDATE ON facility_units
FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_bookings_updated_at
BEFORE UPDATE ON bookings
FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_payment_vouchers_updated_at
BEFORE UPDATE ON payment_vouchers
FOR EACH ROW EXECUTE FUNCTION set_updated_at();

-- ============================================================
-- FUNCTION: prevent_cancelled_booking_update
-- Cancellation is terminal
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_cancelled_booking_update()
RETURNS TRIGGER AS $$
BEGIN
    IF OLD.is_cancelled THEN
        RAISE EXCEPTION 'Booking % is cancelled and cannot be modified', OLD.id;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_bookings_cancel_terminal
BEFORE UPDATE ON bookings
FOR EACH ROW
WHEN (OLD.is_cancelled AND (OLD.refund_amount = NEW.refund_amount))
EXECUTE FUNCTION prevent_cancelled_booking_update();
";

const DROP_ALL_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_bookings_cancel_terminal ON bookings;
DROP TRIGGER IF EXISTS trg_payment_vouchers_updated_at ON payment_vouchers;
DROP TRIGGER IF EXISTS trg_bookings_updated_at ON bookings;
DROP TRIGGER IF EXISTS trg_facility_units_updated_at ON facility_units;
DROP TRIGGER IF EXISTS trg_members_updated_at ON members;

DROP FUNCTION IF EXISTS prevent_cancelled_booking_update();
DROP FUNCTION IF EXISTS set_updated_at();

-- Drop tables (reverse order of creation)
DROP TABLE IF EXISTS payment_vouchers CASCADE;
DROP TABLE IF EXISTS out_of_order_periods CASCADE;
DROP TABLE IF EXISTS holds CASCADE;
DROP TABLE IF EXISTS reservations CASCADE;
DROP TABLE IF EXISTS booking_claims CASCADE;
DROP TABLE IF EXISTS booking_units CASCADE;
DROP TABLE IF EXISTS bookings CASCADE;
DROP TABLE IF EXISTS facility_units CASCADE;
DROP TABLE IF EXISTS members CASCADE;

-- Drop enums
DROP TYPE IF EXISTS payer_role CASCADE;
DROP TYPE IF EXISTS payment_mode CASCADE;
DROP TYPE IF EXISTS voucher_status CASCADE;
DROP TYPE IF EXISTS voucher_type CASCADE;
DROP TYPE IF EXISTS payment_status CASCADE;
DROP TYPE IF EXISTS pricing_type CASCADE;
DROP TYPE IF EXISTS facility_type CASCADE;
";
