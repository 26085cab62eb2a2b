// src/db/movement_repo.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::estoques::{Movement, MovementType, StockEntry},
};

const MOVEMENT_COLUMNS: &str = "id, workspace_id, estoque_id, epi_id, epi_name, type, quantity, \
                                value, order_number, delivery_note, destination_estoque_id, \
                                observations, created_at";

// A listagem devolve no máximo as 100 movimentações mais recentes
const MOVEMENT_PAGE_LIMIT: i64 = 100;

#[derive(Debug)]
pub struct NewMovement<'a> {
    pub workspace_id: Uuid,
    pub estoque_id: Uuid,
    pub epi_id: Uuid,
    pub epi_name: Option<&'a str>,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub value: Option<Decimal>,
    pub order_number: Option<&'a str>,
    pub delivery_note: Option<&'a str>,
    pub destination_estoque_id: Option<Uuid>,
    pub observations: Option<&'a str>,
}

#[derive(Clone)]
pub struct MovementRepository {
    pool: PgPool,
}

impl MovementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_estoque(&self, estoque_id: Uuid) -> Result<Vec<Movement>, AppError> {
        let sql = format!(
            r#"
            SELECT {MOVEMENT_COLUMNS}
            FROM movements
            WHERE estoque_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#
        );

        let movements = sqlx::query_as::<_, Movement>(&sql)
            .bind(estoque_id)
            .bind(MOVEMENT_PAGE_LIMIT)
            .fetch_all(&self.pool)
            .await?;

        Ok(movements)
    }

    // Persiste o registro exatamente como validado. Não há verificação de
    // existência do estoque/EPI nem reconciliação de saldo; o livro-razão
    // aceita o que o cliente mandou.
    pub async fn create(&self, movement: NewMovement<'_>) -> Result<Movement, AppError> {
        let sql = format!(
            r#"
            INSERT INTO movements
                (workspace_id, estoque_id, epi_id, epi_name, type, quantity, value,
                 order_number, delivery_note, destination_estoque_id, observations)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {MOVEMENT_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, Movement>(&sql)
            .bind(movement.workspace_id)
            .bind(movement.estoque_id)
            .bind(movement.epi_id)
            .bind(movement.epi_name)
            .bind(movement.movement_type)
            .bind(movement.quantity)
            .bind(movement.value)
            .bind(movement.order_number)
            .bind(movement.delivery_note)
            .bind(movement.destination_estoque_id)
            .bind(movement.observations)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    // Saldo por EPI derivado do livro-razão, visto do estoque `estoque_id`:
    //   Entrada e Ajuste somam; Saída subtrai; Transferência subtrai quando o
    //   estoque é a origem e soma quando é o destino. Uma transferência sem
    //   destino só debita a origem; origem igual ao destino não altera saldo.
    // O nome do EPI vem do catálogo quando ele ainda existe, senão do nome
    // desnormalizado gravado na movimentação.
    pub async fn stock_by_estoque(&self, estoque_id: Uuid) -> Result<Vec<StockEntry>, AppError> {
        let entries = sqlx::query_as::<_, StockEntry>(
            r#"
            SELECT
                m.epi_id,
                COALESCE(e.name, MAX(m.epi_name), '') AS epi_name,
                SUM(CASE
                    WHEN m.type = 'Transferência'
                         AND m.estoque_id = $1
                         AND m.destination_estoque_id = $1 THEN 0
                    WHEN m.type IN ('Entrada', 'Ajuste') AND m.estoque_id = $1 THEN m.quantity
                    WHEN m.type = 'Saída' AND m.estoque_id = $1 THEN -m.quantity
                    WHEN m.type = 'Transferência' AND m.estoque_id = $1 THEN -m.quantity
                    WHEN m.type = 'Transferência' AND m.destination_estoque_id = $1 THEN m.quantity
                    ELSE 0
                END)::BIGINT AS quantity,
                MAX(m.created_at) AS last_movement
            FROM movements m
            LEFT JOIN epis e ON e.id = m.epi_id
            WHERE m.estoque_id = $1 OR m.destination_estoque_id = $1
            GROUP BY m.epi_id, e.name
            ORDER BY epi_name
            "#,
        )
        .bind(estoque_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
