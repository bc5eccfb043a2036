//! The three stage functions and their prompts
//!
//! Prompt text is the behavioral contract of this system: the dialect,
//! the row-limit directive, the column-selection rules, and the schema
//! grounding all live in `QUERY_SYSTEM_PROMPT`. Changing its wording
//! changes what queries come back.

use crate::error::PipelineError;
use askdb_llm::{LanguageModel, Message};
use askdb_store::SqlStore;

/// System instruction for SQL generation.
///
/// Placeholders: `{dialect}`, `{row_limit}`, `{table_info}`.
const QUERY_SYSTEM_PROMPT: &str = "\
Given an input question, create a syntactically correct {dialect} query to
run to help find the answer. Unless the user specifies in his question a
specific number of examples they wish to obtain, always limit your query to
at most {row_limit} results. You can order the results by a relevant column to
return the most interesting examples in the database.

Never query for all the columns from a specific table, only ask for the
few relevant columns given the question.

Pay attention to use only the column names that you can see in the schema
description. Be careful to not query for columns that do not exist. Also,
pay attention to which column is in which table.

Only use the following tables:
{table_info}
";

/// Build the two-message prompt for the SQL-generation call
pub fn build_query_messages(
    dialect: &str,
    row_limit: usize,
    table_info: &str,
    question: &str,
) -> Vec<Message> {
    let system = QUERY_SYSTEM_PROMPT
        .replace("{dialect}", dialect)
        .replace("{row_limit}", &row_limit.to_string())
        .replace("{table_info}", table_info);
    vec![
        Message::system(system),
        Message::user(format!("Question: {}", question)),
    ]
}

/// Build the single free-text prompt for the answer-generation call
pub fn build_answer_prompt(question: &str, query: &str, result: &str) -> String {
    format!(
        "Given the following user question, corresponding SQL query, \
         and SQL result, answer the user question.\n\n\
         Question: {}\n\
         SQL Query: {}\n\
         SQL Result: {}",
        question, query, result
    )
}

/// Stage 1: generate a SQL query grounded in the live schema.
///
/// Invokes the model in structured mode; if the backend cannot produce a
/// conforming `QueryOutput` the stage fails and the pipeline halts. The
/// generator refuses to run against an empty schema description.
pub async fn write_query(
    question: &str,
    store: &dyn SqlStore,
    model: &dyn LanguageModel,
    row_limit: usize,
) -> Result<String, PipelineError> {
    let table_info = store.table_info().await?;
    if table_info.trim().is_empty() {
        return Err(PipelineError::EmptySchema);
    }

    let messages = build_query_messages(store.dialect(), row_limit, &table_info, question);
    let output = model.generate_query(&messages).await?;
    tracing::info!(query = %output.query, "generated query");
    Ok(output.query)
}

/// Stage 2: execute the generated query.
///
/// Execution failure is data, not an error: the store's error text becomes
/// the result string so the answer stage can explain the failure. The SQL
/// is run exactly as generated; this is the trust boundary.
pub async fn execute_query(query: &str, store: &dyn SqlStore) -> String {
    match store.run(query).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(query, error = %e, "query execution failed; capturing as result");
            format!("Error: {}", e)
        }
    }
}

/// Stage 3: answer the question from the query and its result.
pub async fn generate_answer(
    question: &str,
    query: &str,
    result: &str,
    model: &dyn LanguageModel,
) -> Result<String, PipelineError> {
    let prompt = build_answer_prompt(question, query, result);
    let answer = model.complete(&[Message::user(prompt)]).await?;
    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn query_prompt_is_fully_substituted() {
        let messages = build_query_messages(
            "sqlite",
            10,
            "CREATE TABLE Employee (EmployeeId INTEGER)",
            "How many Employees are there?",
        );
        assert_eq!(messages.len(), 2);

        let system = &messages[0].content;
        assert!(system.contains("syntactically correct sqlite query"));
        assert!(system.contains("at most 10 results"));
        assert!(system.contains("CREATE TABLE Employee"));
        assert!(!system.contains('{'), "unsubstituted placeholder left in prompt");

        assert_eq!(
            messages[1].content,
            "Question: How many Employees are there?"
        );
    }

    #[test]
    fn answer_prompt_embeds_all_three_parts() {
        let prompt = build_answer_prompt(
            "How many Employees are there?",
            "SELECT COUNT(EmployeeId) FROM Employee",
            "count\n8",
        );
        assert!(prompt.contains("Question: How many Employees are there?"));
        assert!(prompt.contains("SQL Query: SELECT COUNT(EmployeeId) FROM Employee"));
        assert!(prompt.contains("SQL Result: count\n8"));
    }
}
