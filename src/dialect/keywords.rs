// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Reserved words and function names.
//!
//! Both tables are matched case-insensitively against the uppercased lexeme;
//! the tokenizer preserves the original casing of the word in its output.
//! Words in either table are never treated as anonymizable identifiers.

/// Reserved SQL keywords. A word found here (unquoted, any casing) is a
/// keyword token, not an identifier.
pub const ALL_KEYWORDS: &[&str] = &[
    "ALL",
    "ALTER",
    "AND",
    "AS",
    "ASC",
    "ASSERT",
    "BEGIN",
    "BETWEEN",
    "BY",
    "CASE",
    "CAST",
    "CHECK",
    "CLOSE",
    "COALESCE",
    "COLUMN",
    "COMMIT",
    "CONSTRAINT",
    "CONTINUE",
    "CREATE",
    "CROSS",
    "CURSOR",
    "DATABASE",
    "DECLARE",
    "DEFAULT",
    "DELETE",
    "DESC",
    "DESCRIBE",
    "DISTINCT",
    "DO",
    "DROP",
    "ELSE",
    "ELSEIF",
    "END",
    "EXCEPT",
    "EXISTS",
    "EXIT",
    "FALSE",
    "FETCH",
    "FOR",
    "FOREIGN",
    "FROM",
    "FULL",
    "FUNCTION",
    "GRANT",
    "GROUP",
    "HAVING",
    "IF",
    "IN",
    "INDEX",
    "INNER",
    "INSERT",
    "INTERSECT",
    "INTO",
    "IS",
    "JOIN",
    "KEY",
    "LEFT",
    "LIKE",
    "LIMIT",
    "LOCK",
    "LOOP",
    "MERGE",
    "NOT",
    "NULL",
    "NULLIF",
    "OFFSET",
    "ON",
    "OPEN",
    "OR",
    "ORDER",
    "OUTER",
    "PRIMARY",
    "PROCEDURE",
    "RAISE",
    "RECURSIVE",
    "REFERENCES",
    "REVOKE",
    "RIGHT",
    "ROLLBACK",
    "SAVEPOINT",
    "SCHEMA",
    "SELECT",
    "SET",
    "SHOW",
    "TABLE",
    "THEN",
    "THROW",
    "TRANSACTION",
    "TRIGGER",
    "TRUE",
    "TRUNCATE",
    "UNION",
    "UNIQUE",
    "UPDATE",
    "UPSERT",
    "USE",
    "VALUES",
    "VIEW",
    "WHEN",
    "WHERE",
    "WHILE",
    "WITH",
];

/// SQL function names (aggregate, string, date/time, numeric). Treated like
/// keywords for classification purposes so that `COUNT(*)` or `AVG(salary)`
/// keep their function name intact.
pub const ALL_FUNCTIONS: &[&str] = &[
    // aggregates
    "ARRAY_AGG",
    "AVG",
    "BIT_AND",
    "BIT_OR",
    "BIT_XOR",
    "CORR",
    "COUNT",
    "COVAR_POP",
    "COVAR_SAMP",
    "GROUP_CONCAT",
    "JSON_AGG",
    "LISTAGG",
    "MAX",
    "MEDIAN",
    "MIN",
    "MODE",
    "STDDEV",
    "STRING_AGG",
    "SUM",
    "VARIANCE",
    // string
    "ASCII",
    "BTRIM",
    "CHAR_LENGTH",
    "CHARINDEX",
    "CHR",
    "CONCAT",
    "CONCAT_WS",
    "FORMAT",
    "INITCAP",
    "LEFT",
    "LEN",
    "LENGTH",
    "LOWER",
    "LPAD",
    "LTRIM",
    "OVERLAY",
    "POSITION",
    "REGEXP_MATCHES",
    "REGEXP_REPLACE",
    "REGEXP_SUBSTR",
    "REPLACE",
    "RIGHT",
    "RPAD",
    "RTRIM",
    "SOUNDEX",
    "SPLIT_PART",
    "STRPOS",
    "SUBSTR",
    "SUBSTRING",
    "TO_CHAR",
    "TRANSLATE",
    "TRIM",
    "UPPER",
    // date/time
    "AGE",
    "CURRENT_DATE",
    "CURRENT_TIME",
    "CURRENT_TIMESTAMP",
    "DATEADD",
    "DATEDIFF",
    "DATEPART",
    "EXTRACT",
    "FROM_UNIXTIME",
    "GETDATE",
    "JULIANDAY",
    "LOCALTIME",
    "LOCALTIMESTAMP",
    "NOW",
    "STRFTIME",
    "SYSDATE",
    "TIMESTAMPADD",
    "TIMESTAMPDIFF",
    "TO_DATE",
    "TO_TIMESTAMP",
    "TO_UNIXTIME",
    // numeric
    "ABS",
    "CEIL",
    "CUME_DIST",
    "DENSE_RANK",
    "DIV",
    "EXP",
    "FLOOR",
    "GREATEST",
    "LEAST",
    "LN",
    "LOG",
    "LOG10",
    "MOD",
    "NTILE",
    "PERCENT_RANK",
    "POWER",
    "RANDOM",
    "RANK",
    "ROUND",
    "ROW_NUMBER",
    "SIGN",
    "SQRT",
    "TRUNC",
    "WIDTH_BUCKET",
];

/// True if `word` (already uppercased) is a reserved keyword.
pub fn is_keyword(word_uppercase: &str) -> bool {
    ALL_KEYWORDS.binary_search(&word_uppercase).is_ok()
}

/// True if `word` (already uppercased) is a known function name.
pub fn is_function(word_uppercase: &str) -> bool {
    ALL_FUNCTIONS.contains(&word_uppercase)
}
