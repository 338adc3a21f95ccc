//! Tool definitions offered to the assistant, and their typed arguments.

use serde::Deserialize;

use super::types::Tool;

pub const CREATE_TRANSACTION: &str = "createTransaction";

/// The single tool the chat assistant may call.
#[must_use]
pub fn assistant_tools() -> Vec<Tool> {
    vec![Tool {
        name: CREATE_TRANSACTION.into(),
        description: "Registra uma nova transação financeira quando todos os dados essenciais estão presentes.".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "type": { "type": "string", "enum": ["receita", "despesa", "investimento"] },
                "amount": { "type": "number", "description": "Valor numérico positivo" },
                "description": { "type": "string", "description": "Descrição clara do lançamento" },
                "categoryId": { "type": "string", "description": "ID da categoria" },
                "date": { "type": "string", "description": "Data ISO AAAA-MM-DD" },
                "paymentMethod": { "type": "string", "description": "Forma de pagamento (PIX, Dinheiro, etc)" }
            },
            "required": ["type", "amount", "description", "categoryId", "date", "paymentMethod"]
        }),
    }]
}

/// Arguments of a `createTransaction` call. Every field is lenient; the
/// assistant service fills defaults for anything missing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTransactionArgs {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub date: Option<String>,
    pub payment_method: Option<String>,
}

#[cfg(test)]
#[path = "tools_test.rs"]
mod tests;
