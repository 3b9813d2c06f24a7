// API client module: a small blocking HTTP client for the shop's REST API
// plus the wire records it returns.
//
// The session only sees the `ShopApi` trait, so the menus can be driven
// against an in-memory fake in tests.

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::Config;
use crate::domain::*;
use crate::error::{ApiError, DomainError};

/// Username and password as typed at the login prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: Username,
    pub password: Password,
}

/// Result of a login attempt that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated(String),
    Rejected,
}

/// Operations the client needs from the shop backend.
pub trait ShopApi {
    /// POST `/login/`. A non-200 answer is a rejection, not an error.
    fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, ApiError>;

    /// GET `/dress/` with the bearer token. Elements are left undecoded,
    /// see [`parse_record`].
    fn dresses(&self, token: &str) -> Result<Vec<Value>, ApiError>;

    /// GET `/loan/` with the bearer token.
    fn loans(&self, token: &str) -> Result<Vec<Value>, ApiError>;
}

/// Form body of the login request.
#[derive(Serialize, Debug)]
struct LoginForm<'a> {
    username: &'a str,
    password: &'a str,
}

/// Body of a successful login.
#[derive(Deserialize, Debug)]
struct LoginResponse {
    access: String,
}

/// Dress as sent by `/dress/`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DressRecord {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub brand_type: String,
    #[serde(deserialize_with = "int_like")]
    pub price_in_cents: i64,
    pub material_type: String,
    pub color_type: String,
    #[serde(deserialize_with = "int_like")]
    pub size: i64,
    pub description: String,
    pub deleted: bool,
}

/// Loan as sent by `/loan/`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoanRecord {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(deserialize_with = "id_as_string")]
    pub dress: String,
    #[serde(deserialize_with = "int_like")]
    pub loaner: i64,
    #[serde(deserialize_with = "int_like")]
    pub total_price: i64,
    #[serde(deserialize_with = "int_like")]
    pub loan_duration_days: i64,
    #[serde(deserialize_with = "int_like")]
    pub insert_by: i64,
    pub terminated: bool,
}

// Some endpoints send numeric ids, others UUID strings.
fn id_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

// Integers may arrive as numbers, whole floats or numeric strings.
fn int_like<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawInt {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match RawInt::deserialize(deserializer)? {
        RawInt::Int(value) => Ok(value),
        RawInt::Float(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
            Ok(value as i64)
        }
        RawInt::Float(value) => Err(D::Error::custom(format!("{value} is not a whole number"))),
        RawInt::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("{text:?} is not a whole number"))),
    }
}

/// Decode one list element. A malformed element is a validation failure
/// of that record, not of the request.
pub fn parse_record<R: DeserializeOwned>(value: Value) -> Result<R, DomainError> {
    serde_json::from_value(value).map_err(|e| DomainError::validation("record", e.to_string()))
}

impl TryFrom<DressRecord> for Dress {
    type Error = DomainError;

    fn try_from(record: DressRecord) -> Result<Self, Self::Error> {
        Ok(Dress {
            id: DressId::new(record.id)?,
            brand: Brand::new(record.brand_type)?,
            price: Price::from_cents(record.price_in_cents)?,
            material: Material::new(record.material_type)?,
            color: Color::new(record.color_type)?,
            size: Size::new(record.size)?,
            description: Description::new(record.description)?,
            deleted: Deleted::new(record.deleted),
        })
    }
}

impl TryFrom<LoanRecord> for DressLoan {
    type Error = DomainError;

    fn try_from(record: LoanRecord) -> Result<Self, Self::Error> {
        Ok(DressLoan {
            id: DressLoanId::new(record.id)?,
            start_date: LoanDate::new(record.start_date)?,
            end_date: LoanDate::new(record.end_date)?,
            dress: DressId::new(record.dress)?,
            loaner: UserId::new(record.loaner)?,
            total_price: Price::from_cents(record.total_price)?,
            duration: DurationDays::new(record.loan_duration_days)?,
            inserted_by: UserId::new(record.insert_by)?,
            terminated: Terminated::new(record.terminated),
        })
    }
}

/// Blocking client for the shop API.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for `config.api_url` with the configured timeout.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(ApiClient {
            client,
            base_url: config.api_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}/", self.base_url, path)
    }

    /// Authorization header for a bearer token.
    fn auth_headers(token: &str) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::Decode("token is not a valid header value".into()))?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    fn get_list(&self, path: &str, token: &str) -> Result<Vec<Value>, ApiError> {
        let url = self.url(path);
        debug!(%url, "fetching");
        let res = self
            .client
            .get(&url)
            .headers(Self::auth_headers(token)?)
            .send()?;
        let items: Option<Vec<Value>> = decode(expect_ok(res)?)?;
        let items = items.unwrap_or_default();
        info!(path, count = items.len(), "fetched records");
        Ok(items)
    }
}

fn expect_ok(res: Response) -> Result<Response, ApiError> {
    if res.status() != StatusCode::OK {
        return Err(ApiError::Status {
            status: res.status().as_u16(),
        });
    }
    Ok(res)
}

fn decode<T: DeserializeOwned>(res: Response) -> Result<T, ApiError> {
    let body = res.text()?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

impl ShopApi for ApiClient {
    fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, ApiError> {
        let url = self.url("login");
        let form = LoginForm {
            username: credentials.username.as_str(),
            password: credentials.password.as_str(),
        };
        let res = self.client.post(&url).form(&form).send()?;
        if res.status() != StatusCode::OK {
            info!(status = res.status().as_u16(), "login rejected");
            return Ok(LoginOutcome::Rejected);
        }
        let body: LoginResponse = decode(res)?;
        Ok(LoginOutcome::Authenticated(body.access))
    }

    fn dresses(&self, token: &str) -> Result<Vec<Value>, ApiError> {
        self.get_list("dress", token)
    }

    fn loans(&self, token: &str) -> Result<Vec<Value>, ApiError> {
        self.get_list("loan", token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dress_record_decodes_camel_case_fields() {
        let record: DressRecord = serde_json::from_value(json!({
            "id": "517e90e5-2020-40d7-aa3a-3507c1ca24dd",
            "brandType": "Versace",
            "priceInCents": 12550,
            "materialType": "Silk",
            "colorType": "Black",
            "size": 42,
            "description": "Long evening dress",
            "deleted": false
        }))
        .unwrap();
        let dress = Dress::try_from(record).unwrap();
        assert_eq!(dress.price.to_string(), "125.50");
        assert_eq!(dress.brand.as_str(), "Versace");
    }

    #[test]
    fn numeric_ids_become_strings() {
        let record: LoanRecord = serde_json::from_value(json!({
            "id": 17,
            "startDate": "2022-01-10",
            "endDate": "2022-01-12",
            "dress": "517e90e5-2020-40d7-aa3a-3507c1ca24dd",
            "loaner": 3,
            "totalPrice": 4000,
            "loanDurationDays": 2,
            "insertBy": 1,
            "terminated": true
        }))
        .unwrap();
        assert_eq!(record.id, "17");
        let loan = DressLoan::try_from(record).unwrap();
        assert!(loan.terminated.value());
        assert_eq!(loan.duration.value(), 2);
    }

    #[test]
    fn invalid_wire_values_fail_conversion() {
        let record = DressRecord {
            id: "d1".into(),
            brand_type: "Gucci".into(),
            price_in_cents: -5,
            material_type: "Cotton".into(),
            color_type: "White".into(),
            size: 38,
            description: "Summer dress".into(),
            deleted: false,
        };
        assert!(matches!(
            Dress::try_from(record),
            Err(DomainError::Validation { field: "price", .. })
        ));
    }

    #[test]
    fn loosely_typed_numbers_are_accepted() {
        let record: DressRecord = parse_record(json!({
            "id": 9,
            "brandType": "Chanel",
            "priceInCents": 9900.0,
            "materialType": "Wool",
            "colorType": "Grey",
            "size": " 40 ",
            "description": "Coat dress",
            "deleted": false
        }))
        .unwrap();
        assert_eq!(record.size, 40);
        assert_eq!(record.price_in_cents, 9900);
    }

    #[test]
    fn wrongly_typed_fields_are_validation_errors() {
        for (field, value) in [
            ("size", json!("forty")),
            ("priceInCents", json!(12.5)),
            ("size", Value::Null),
        ] {
            let mut raw = json!({
                "id": "d1",
                "brandType": "Chanel",
                "priceInCents": 100,
                "materialType": "Wool",
                "colorType": "Grey",
                "size": 40,
                "description": "Coat dress",
                "deleted": false
            });
            raw[field] = value;
            assert!(
                matches!(
                    parse_record::<DressRecord>(raw),
                    Err(DomainError::Validation { field: "record", .. })
                ),
                "{field} should be rejected"
            );
        }
    }

    #[test]
    fn urls_end_with_a_slash() {
        let client = ApiClient::new(&Config {
            api_url: "http://localhost:8000/api/v1".into(),
            ..Config::default()
        })
        .unwrap();
        assert_eq!(client.url("dress"), "http://localhost:8000/api/v1/dress/");
    }

    #[test]
    fn bearer_header_is_built_from_the_token() {
        let headers = ApiClient::auth_headers("abc.def.ghi").unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer abc.def.ghi");
        assert!(ApiClient::auth_headers("bad\ntoken").is_err());
    }
}
