// Test doubles shared by the integration tests: an in-memory shop API
// and a console that replays a script and records what it prints.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;

use dressy_cli::api::{Credentials, DressRecord, LoanRecord, LoginOutcome, ShopApi};
use dressy_cli::error::ApiError;
use dressy_cli::ui::Console;
use serde::Serialize;
use serde_json::Value;

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "secret";

pub struct FakeApi {
    pub token: String,
    pub dresses: Result<Vec<Value>, u16>,
    pub loans: Result<Vec<Value>, u16>,
    pub login_attempts: RefCell<Vec<String>>,
    pub fetch_tokens: RefCell<Vec<String>>,
}

impl FakeApi {
    pub fn new(dresses: Vec<DressRecord>, loans: Vec<LoanRecord>) -> Self {
        Self {
            token: "header.payload.signature".into(),
            dresses: Ok(to_values(dresses)),
            loans: Ok(to_values(loans)),
            login_attempts: RefCell::new(Vec::new()),
            fetch_tokens: RefCell::new(Vec::new()),
        }
    }

    fn answer(&self, token: &str, data: &Result<Vec<Value>, u16>) -> Result<Vec<Value>, ApiError> {
        self.fetch_tokens.borrow_mut().push(token.to_string());
        data.clone().map_err(|status| ApiError::Status { status })
    }
}

impl ShopApi for FakeApi {
    fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, ApiError> {
        self.login_attempts
            .borrow_mut()
            .push(credentials.username.as_str().to_string());
        if credentials.username.as_str() == USERNAME && credentials.password.as_str() == PASSWORD {
            Ok(LoginOutcome::Authenticated(self.token.clone()))
        } else {
            Ok(LoginOutcome::Rejected)
        }
    }

    fn dresses(&self, token: &str) -> Result<Vec<Value>, ApiError> {
        self.answer(token, &self.dresses)
    }

    fn loans(&self, token: &str) -> Result<Vec<Value>, ApiError> {
        self.answer(token, &self.loans)
    }
}

pub fn to_values<T: Serialize>(records: Vec<T>) -> Vec<Value> {
    records
        .into_iter()
        .map(|record| serde_json::to_value(record).unwrap())
        .collect()
}

#[derive(Default)]
pub struct ScriptedConsole {
    pub input: VecDeque<String>,
    pub out: Vec<String>,
    pub err: Vec<String>,
}

impl ScriptedConsole {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            input: lines.iter().map(|l| l.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn printed(&self, line: &str) -> bool {
        self.out.iter().any(|l| l == line)
    }

    pub fn count(&self, line: &str) -> usize {
        self.out.iter().filter(|l| *l == line).count()
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, _prompt: &str) -> io::Result<String> {
        self.input
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }

    fn read_secret(&mut self, prompt: &str) -> io::Result<String> {
        self.read_line(prompt)
    }

    fn say(&mut self, line: &str) {
        self.out.push(line.to_string());
    }

    fn complain(&mut self, line: &str) {
        self.err.push(line.to_string());
    }
}

pub fn dress(id: &str, price_in_cents: i64) -> DressRecord {
    DressRecord {
        id: id.into(),
        brand_type: "Valentino".into(),
        price_in_cents,
        material_type: "Silk".into(),
        color_type: "Red".into(),
        size: 40,
        description: "Evening gown".into(),
        deleted: false,
    }
}

pub fn loan(id: &str, total_price: i64) -> LoanRecord {
    LoanRecord {
        id: id.into(),
        start_date: "2022-05-01".into(),
        end_date: "2022-05-04".into(),
        dress: "d-1".into(),
        loaner: 2,
        total_price,
        loan_duration_days: 3,
        insert_by: 1,
        terminated: false,
    }
}
