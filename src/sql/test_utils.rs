//! Checks emitted statements by parsing them back with sqlparser.

use sqlparser::parser::Parser;

use super::dialect::Dialect;

/// Validates that a SQL string is exactly one valid statement for the given dialect.
pub fn validate_sql(sql: &str, dialect: Dialect) -> Result<(), String> {
    let statements = Parser::parse_sql(&*dialect.parser_dialect(), sql)
        .map_err(|e| format!("Invalid SQL for {:?}: {}\nSQL: {}", dialect, e, sql))?;

    match statements.len() {
        1 => Ok(()),
        n => Err(format!("Expected 1 statement, got {n}\nSQL: {sql}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_sql() {
        validate_sql("SELECT * FROM \"update\";", Dialect::Sqlite).unwrap();
        validate_sql("SELECT * FROM `update` LIMIT ?;", Dialect::MySql).unwrap();
        validate_sql("SELECT * FROM \"update\" LIMIT $1;", Dialect::Postgres).unwrap();
    }

    #[test]
    fn test_validate_invalid_sql() {
        let result = validate_sql("SELEC * FORM users", Dialect::Postgres);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_batches() {
        let result = validate_sql("SELECT 1; SELECT 2;", Dialect::Sqlite);
        assert!(result.is_err());
    }
}
