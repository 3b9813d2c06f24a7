// Library root
// ------------
// Command-line client for the Dressy dress-rental shop. The binary
// (`main.rs`) wires these modules into an interactive session.
//
// Module responsibilities:
// - `domain`: validated value objects, `Dress` and `DressLoan`.
// - `lists`: bounded, duplicate-free in-memory collections.
// - `api`: blocking HTTP client for login, dresses and loans.
// - `token`: reads the display role out of the session token.
// - `session`: menu state machine driving the whole interaction.
// - `ui`: console abstraction and table rendering.
// - `config`, `logging`, `error`: ambient plumbing.
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod lists;
pub mod logging;
pub mod session;
pub mod token;
pub mod ui;
