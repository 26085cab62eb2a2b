// src/models/estoques.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "estoque_type")]
pub enum EstoqueType {
    #[sqlx(rename = "Central")]
    Central,
    #[sqlx(rename = "Obra")]
    Obra,
}

// Local de armazenamento: o almoxarifado central ou o estoque de uma obra
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Estoque {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub estoque_type: EstoqueType,
    pub location: String,
    pub responsible: Option<String>,
    pub capacity: Option<i32>,
    pub observations: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "movement_type")]
pub enum MovementType {
    #[sqlx(rename = "Entrada")]
    Entrada,
    #[sqlx(rename = "Saída")]
    #[serde(rename = "Saída")]
    Saida,
    #[sqlx(rename = "Transferência")]
    #[serde(rename = "Transferência")]
    Transferencia,
    #[sqlx(rename = "Ajuste")]
    Ajuste,
}

// Movimentação do livro-razão de estoque. Imutável: só existe INSERT.
// Uma transferência é uma única linha, lida dos dois lados na agregação
// (débito na origem, crédito no destino).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub estoque_id: Uuid,
    pub epi_id: Uuid,
    // Nome do EPI desnormalizado no momento do registro
    pub epi_name: Option<String>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity: i32,
    pub value: Option<Decimal>,
    pub order_number: Option<String>,
    // Canhoto de envio
    pub delivery_note: Option<String>,
    // Preenchido apenas em transferências
    pub destination_estoque_id: Option<Uuid>,
    pub observations: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status")]
pub enum OrderStatus {
    #[sqlx(rename = "Pendente")]
    Pendente,
    #[sqlx(rename = "Aprovado")]
    Aprovado,
    #[sqlx(rename = "Em Trânsito")]
    #[serde(rename = "Em Trânsito")]
    EmTransito,
    #[sqlx(rename = "Recebido")]
    Recebido,
    #[sqlx(rename = "Cancelado")]
    Cancelado,
}

// Pedido de compra. O modelo e a tabela existem, mas nenhuma rota é montada
// para ele ainda.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub order_number: String,
    pub supplier: String,
    pub status: OrderStatus,
    pub total_value: Decimal,
    pub expected_date: Option<String>,
    pub received_date: Option<String>,
    pub observations: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha do agregado de saldo por EPI de um estoque, derivada do livro-razão
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockEntry {
    pub epi_id: Uuid,
    pub epi_name: String,
    pub quantity: i64,
    pub last_movement: Option<DateTime<Utc>>,
}

// Estoque com o saldo calculado. Nunca é persistido: existe só como
// resposta de GET /api/estoques/{id}/stock.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EstoqueWithStock {
    #[serde(flatten)]
    pub estoque: Estoque,
    pub stock: Vec<StockEntry>,
}
