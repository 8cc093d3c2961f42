use crate::error::Result;
use crate::rest::CoraClient;
use crate::time::Date;
use serde_json::Value;
use url::form_urlencoded;

const STATEMENT_PATH: &str = "/bank-statement/statement";

/// Bank statement endpoint
pub struct BankStatement<'a> {
    client: &'a CoraClient,
}

impl CoraClient {
    pub fn bank_statement(&self) -> BankStatement<'_> {
        BankStatement { client: self }
    }
}

impl<'a> BankStatement<'a> {
    /// Fetch the statement between `start` and `end` (inclusive), optionally paginated
    pub fn get(
        &self,
        start: Date,
        end: Date,
        page: Option<u32>,
        size: Option<u32>,
    ) -> Result<Value> {
        let path = statement_path(start, end, page, size);
        Ok(self.client.get(&path)?.into_body())
    }
}

fn statement_path(start: Date, end: Date, page: Option<u32>, size: Option<u32>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query
        .append_pair("start", &start.to_string())
        .append_pair("end", &end.to_string());

    if let Some(page) = page {
        query.append_pair("page", &page.to_string());
    }
    if let Some(size) = size {
        query.append_pair("size", &size.to_string());
    }

    format!("{}?{}", STATEMENT_PATH, query.finish())
}
