// Session state machine.
//
// Every menu is a row in a static table: the key the user types, the
// label shown next to it and the action to run. An action receives the
// session context and returns the state to show next, so the whole flow
// is `state -> menu -> entry -> action -> state`.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::api::{parse_record, Credentials, DressRecord, LoanRecord, LoginOutcome, ShopApi};
use crate::domain::*;
use crate::error::{DomainError, SessionError};
use crate::lists::{DressList, DressLoanList, Record, RecordList};
use crate::token;
use crate::ui::{self, Console};

/// Where the user is in the menu hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    LoggedOut,
    ChoiceMenu,
    DressLoanSubmenu,
    DressSubmenu,
    Exit,
}

/// Data owned by one logged-in session.
///
/// Local edits to the lists stay here; they are never sent to the server.
#[derive(Debug, Default)]
pub struct Session {
    token: Option<String>,
    role: Option<String>,
    pub dresses: DressList,
    pub loans: DressLoanList,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    /// Forget the token and everything fetched with it.
    pub fn logout(&mut self) {
        self.token = None;
        self.role = None;
        self.dresses.clear();
        self.loans.clear();
    }
}

/// Everything an action may touch.
pub struct Context<'a> {
    pub api: &'a dyn ShopApi,
    pub console: &'a mut dyn Console,
    pub session: &'a mut Session,
    pub jwt_secret: Option<&'a str>,
}

pub type Action = fn(&mut Context<'_>) -> Result<MenuState, SessionError>;

/// One selectable line of a menu.
pub struct Entry {
    pub key: &'static str,
    pub label: &'static str,
    pub action: Action,
}

/// A menu: title, something printed before the entries, and the entries.
pub struct Menu {
    pub title: &'static str,
    pub banner: fn(&mut Context<'_>),
    pub entries: &'static [Entry],
}

impl Menu {
    pub fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.key == key)
    }
}

static LOGGED_OUT_MENU: Menu = Menu {
    title: "Dressy",
    banner: |ctx| ctx.console.say("Welcome! Please select an option"),
    entries: &[
        Entry { key: "1", label: "Login", action: login },
        Entry { key: "0", label: "Exit", action: exit },
    ],
};

static CHOICE_MENU: Menu = Menu {
    title: "Dressy - Choice Menu",
    banner: |ctx| ctx.console.say("Select the menu to display"),
    entries: &[
        Entry { key: "1", label: "Dressloan", action: |_| Ok(MenuState::DressLoanSubmenu) },
        Entry { key: "2", label: "Dress", action: |_| Ok(MenuState::DressSubmenu) },
        Entry { key: "0", label: "Go back to Login", action: logout },
    ],
};

static DRESS_LOAN_MENU: Menu = Menu {
    title: "Dressy - Dress Loan Menu",
    banner: print_loans,
    entries: &[
        Entry { key: "1", label: "Sort by total price", action: sort_loans },
        Entry { key: "2", label: "Delete dress loan", action: remove_loan },
        Entry { key: "0", label: "Go back to Choice Menu", action: back_to_choice },
    ],
};

static DRESS_MENU: Menu = Menu {
    title: "Dressy - Dress Menu",
    banner: print_dresses,
    entries: &[
        Entry { key: "1", label: "Sort by price", action: sort_dresses },
        Entry { key: "2", label: "Add dress", action: add_dress },
        Entry { key: "3", label: "Delete dress", action: remove_dress },
        Entry { key: "0", label: "Go back to Choice Menu", action: back_to_choice },
    ],
};

/// Menu shown in `state`; `None` once the user has left.
pub fn menu_for(state: MenuState) -> Option<&'static Menu> {
    match state {
        MenuState::LoggedOut => Some(&LOGGED_OUT_MENU),
        MenuState::ChoiceMenu => Some(&CHOICE_MENU),
        MenuState::DressLoanSubmenu => Some(&DRESS_LOAN_MENU),
        MenuState::DressSubmenu => Some(&DRESS_MENU),
        MenuState::Exit => None,
    }
}

fn exit(ctx: &mut Context<'_>) -> Result<MenuState, SessionError> {
    ctx.console.say("Bye Bye!");
    Ok(MenuState::Exit)
}

fn logout(ctx: &mut Context<'_>) -> Result<MenuState, SessionError> {
    ctx.session.logout();
    info!("logged out");
    ctx.console.say("Logged out");
    Ok(MenuState::LoggedOut)
}

fn back_to_choice(ctx: &mut Context<'_>) -> Result<MenuState, SessionError> {
    ctx.console.say("Make a choice");
    Ok(MenuState::ChoiceMenu)
}

/// Ask for credentials until the server accepts them or the user types `0`.
fn login(ctx: &mut Context<'_>) -> Result<MenuState, SessionError> {
    loop {
        let username = ui::read_with(ctx.console, "Username", |s| Username::new(s))?;
        if username.as_str() == "0" {
            return Ok(MenuState::LoggedOut);
        }
        let password = ui::read_secret_with(ctx.console, "Password", |s| Password::new(s))?;
        if password.as_str() == "0" {
            return Ok(MenuState::LoggedOut);
        }

        let credentials = Credentials { username, password };
        ctx.console.busy("Logging in...");
        let outcome = ctx.api.login(&credentials);
        ctx.console.idle();

        match outcome? {
            LoginOutcome::Rejected => ctx.console.say("This user does not exist!"),
            LoginOutcome::Authenticated(token) => {
                info!(user = credentials.username.as_str(), "login succeeded");
                show_role(ctx, &token);
                ctx.console.say("Login success");
                ctx.session.token = Some(token);
                return enter_choice_menu(ctx);
            }
        }
    }
}

fn show_role(ctx: &mut Context<'_>, token: &str) {
    let Some(secret) = ctx.jwt_secret else {
        warn!("DRESSY_JWT_SECRET is not set, role not shown");
        return;
    };
    match token::decode_role(token, secret) {
        Ok(role) => {
            ctx.console.say(&role);
            ctx.session.role = Some(role);
        }
        Err(err) => warn!(%err, "could not read role from token"),
    }
}

/// Replace both lists with a fresh snapshot from the server.
///
/// A bad record is reported and the menu is still entered; a failed
/// request ends the session.
fn enter_choice_menu(ctx: &mut Context<'_>) -> Result<MenuState, SessionError> {
    let Some(token) = ctx.session.token.clone() else {
        return Ok(MenuState::LoggedOut);
    };
    ctx.session.loans.clear();
    ctx.session.dresses.clear();

    ctx.console.busy("Loading dress loans...");
    let loans = ctx.api.loans(&token);
    ctx.console.idle();
    if let Err(err) = store::<LoanRecord, _>(&mut ctx.session.loans, loans?) {
        warn!(%err, "dress loan snapshot rejected");
        ctx.console.say(&err.to_string());
    }

    ctx.console.busy("Loading dresses...");
    let dresses = ctx.api.dresses(&token);
    ctx.console.idle();
    if let Err(err) = store::<DressRecord, _>(&mut ctx.session.dresses, dresses?) {
        warn!(%err, "dress snapshot rejected");
        ctx.console.say(&err.to_string());
    }

    debug!(
        dresses = ctx.session.dresses.length(),
        loans = ctx.session.loans.length(),
        "snapshot loaded"
    );
    Ok(MenuState::ChoiceMenu)
}

/// Decode, validate and add each raw record, stopping at the first bad one.
fn store<R, T>(list: &mut RecordList<T>, records: Vec<Value>) -> Result<(), DomainError>
where
    R: DeserializeOwned,
    T: Record + TryFrom<R, Error = DomainError>,
{
    for raw in records {
        let record: R = parse_record(raw)?;
        list.add(T::try_from(record)?)?;
    }
    Ok(())
}

fn print_dresses(ctx: &mut Context<'_>) {
    for line in ui::dress_table(ctx.session.dresses.items()) {
        ctx.console.say(&line);
    }
}

fn print_loans(ctx: &mut Context<'_>) {
    for line in ui::loan_table(ctx.session.loans.items()) {
        ctx.console.say(&line);
    }
}

fn sort_dresses(ctx: &mut Context<'_>) -> Result<MenuState, SessionError> {
    ctx.session.dresses.sort_by_price();
    Ok(MenuState::DressSubmenu)
}

fn sort_loans(ctx: &mut Context<'_>) -> Result<MenuState, SessionError> {
    ctx.session.loans.sort_by_total_price();
    Ok(MenuState::DressLoanSubmenu)
}

/// Read a new dress from the user and add it to the local list.
///
/// The identifier is generated, never typed.
fn add_dress(ctx: &mut Context<'_>) -> Result<MenuState, SessionError> {
    let dress = Dress {
        id: DressId::generate(),
        brand: ui::read_with(ctx.console, "Brand", |s| Brand::new(s))?,
        price: ui::read_with(ctx.console, "Price", Price::parse)?,
        material: ui::read_with(ctx.console, "Material", |s| Material::new(s))?,
        color: ui::read_with(ctx.console, "Color", |s| Color::new(s))?,
        size: ui::read_with(ctx.console, "Size", |s| s.parse::<Size>())?,
        description: ui::read_with(ctx.console, "Description", |s| Description::new(s))?,
        deleted: Deleted::new(false),
    };

    match ctx.session.dresses.add(dress) {
        Ok(()) => {
            info!(count = ctx.session.dresses.length(), "dress added locally");
            ctx.console.say("Dress added!");
        }
        Err(err) => ctx.console.say(&err.to_string()),
    }
    Ok(MenuState::DressSubmenu)
}

/// Ask for a 1-based position in a list of `len` items; `0` means cancel.
fn read_position(ctx: &mut Context<'_>, len: usize) -> Result<Option<usize>, SessionError> {
    let position = ui::read_with(ctx.console, "Index (0 to cancel)", |s| {
        let value: usize = s
            .parse()
            .map_err(|_| DomainError::validation("index", "expected a whole number"))?;
        if value > len {
            return Err(DomainError::validation("index", format!("must be within 0..={len}")));
        }
        Ok(value)
    })?;
    if position == 0 {
        ctx.console.say("Cancelled!");
        return Ok(None);
    }
    Ok(Some(position - 1))
}

fn remove_dress(ctx: &mut Context<'_>) -> Result<MenuState, SessionError> {
    let len = ctx.session.dresses.length();
    if let Some(index) = read_position(ctx, len)? {
        match ctx.session.dresses.remove_by_index(index) {
            Ok(removed) => {
                info!(id = removed.id.as_str(), "dress removed locally");
                ctx.console.say("Dress removed!");
            }
            Err(err) => ctx.console.say(&err.to_string()),
        }
    }
    Ok(MenuState::DressSubmenu)
}

fn remove_loan(ctx: &mut Context<'_>) -> Result<MenuState, SessionError> {
    let len = ctx.session.loans.length();
    if let Some(index) = read_position(ctx, len)? {
        match ctx.session.loans.remove_by_index(index) {
            Ok(removed) => {
                info!(id = removed.id.as_str(), "dress loan removed locally");
                ctx.console.say("Dress loan removed!");
            }
            Err(err) => ctx.console.say(&err.to_string()),
        }
    }
    Ok(MenuState::DressLoanSubmenu)
}

/// Interactive application: owns the collaborators and the session.
pub struct App<A: ShopApi, C: Console> {
    api: A,
    console: C,
    jwt_secret: Option<String>,
    session: Session,
    state: MenuState,
}

impl<A: ShopApi, C: Console> App<A, C> {
    pub fn new(api: A, console: C, jwt_secret: Option<String>) -> Self {
        Self {
            api,
            console,
            jwt_secret,
            session: Session::new(),
            state: MenuState::LoggedOut,
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn into_console(self) -> C {
        self.console
    }

    /// Show the current menu, wait for a valid key and run its action.
    pub fn step(&mut self) -> Result<MenuState, SessionError> {
        let Some(menu) = menu_for(self.state) else {
            return Ok(MenuState::Exit);
        };
        let mut ctx = Context {
            api: &self.api,
            console: &mut self.console,
            session: &mut self.session,
            jwt_secret: self.jwt_secret.as_deref(),
        };

        ctx.console.say("");
        ctx.console.say(menu.title);
        (menu.banner)(&mut ctx);
        for entry in menu.entries {
            ctx.console.say(&format!("{}:\t{}", entry.key, entry.label));
        }

        let entry = loop {
            let key = ctx.console.read_line("?")?;
            match menu.entry(key.trim()) {
                Some(entry) => break entry,
                None => ctx.console.say("Invalid selection"),
            }
        };
        debug!(menu = menu.title, key = entry.key, "selected");
        self.state = (entry.action)(&mut ctx)?;
        Ok(self.state)
    }

    /// Run until the user exits. Failures are reported, never propagated.
    pub fn run(&mut self) {
        let outcome = loop {
            match self.step() {
                Ok(MenuState::Exit) => break Ok(()),
                Ok(_) => {}
                Err(err) => break Err(err),
            }
        };

        match outcome {
            Ok(()) => {}
            Err(SessionError::Transport(err)) => {
                error!(%err, "remote call failed");
                self.console.say("Failed to connect to the server! Try later!");
            }
            Err(err) => {
                error!(%err, "session aborted");
                self.console.complain(&err.to_string());
                self.console.complain("Panic error!");
            }
        }
        self.session.logout();
        self.state = MenuState::Exit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_menu_has_a_way_back() {
        for state in [
            MenuState::LoggedOut,
            MenuState::ChoiceMenu,
            MenuState::DressLoanSubmenu,
            MenuState::DressSubmenu,
        ] {
            let menu = menu_for(state).unwrap();
            assert!(menu.entry("0").is_some(), "{state:?} has no 0 entry");
        }
        assert!(menu_for(MenuState::Exit).is_none());
    }

    #[test]
    fn keys_are_unique_within_a_menu() {
        for menu in [&LOGGED_OUT_MENU, &CHOICE_MENU, &DRESS_LOAN_MENU, &DRESS_MENU] {
            let mut keys: Vec<_> = menu.entries.iter().map(|e| e.key).collect();
            keys.sort_unstable();
            keys.dedup();
            assert_eq!(keys.len(), menu.entries.len(), "{}", menu.title);
        }
    }

    #[test]
    fn logout_discards_token_and_lists() {
        let mut session = Session::new();
        session.token = Some("t".into());
        session.role = Some("user".into());
        session.logout();
        assert!(!session.is_logged_in());
        assert!(session.role().is_none());
        assert!(session.dresses.is_empty());
    }
}
