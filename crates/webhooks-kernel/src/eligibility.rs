use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::Value;
use webhooks_contracts::{AddressQuery, Protocol};

use crate::params::{display, SessionParameters};

/// Ticket statuses that still count as an open bulky-waste request.
pub const OPEN_STATUSES: &[&str] = &[
    "Aberto",
    "Em Andamento",
    "Em andamento privado",
    "Encaminhado à Comlurb - resíduo",
    "Pendente",
];

const BULKY_WASTE_CLASSIFICATION: &str = "1607";
const COOLDOWN_DAYS: i64 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    OpenTicket,
    RecentlyClosed,
    Unknown,
}

impl Eligibility {
    pub fn justification(self) -> Option<&'static str> {
        match self {
            Eligibility::Eligible => None,
            Eligibility::OpenTicket => Some("chamado_aberto"),
            Eligibility::RecentlyClosed => Some("chamado_fechado_12_dias"),
            Eligibility::Unknown => Some("erro_desconhecido"),
        }
    }

    /// Writes the verdict under `key` and its justification under `<key>_justificativa`.
    pub fn record(self, params: &mut SessionParameters, key: &str) {
        params.insert(key.to_string(), Value::Bool(self == Eligibility::Eligible));
        if let Some(reason) = self.justification() {
            params.insert(format!("{key}_justificativa"), Value::from(reason));
        }
    }
}

/// A new bulky-waste removal is refused while another one is open or was closed
/// within the last twelve days.
pub fn evaluate(protocols: &[Protocol], today: NaiveDate) -> Eligibility {
    for protocol in protocols {
        for ticket in &protocol.tickets {
            if display(&ticket.classification) != BULKY_WASTE_CLASSIFICATION {
                continue;
            }
            if OPEN_STATUSES.contains(&ticket.status.as_str()) {
                return Eligibility::OpenTicket;
            }
            let closed = ticket
                .end_date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
            match closed {
                Some(closed) if (today - closed).num_days() <= COOLDOWN_DAYS => {
                    return Eligibility::RecentlyClosed
                }
                Some(_) => {}
                None => return Eligibility::Unknown,
            }
        }
    }
    Eligibility::Eligible
}

fn optional_text(params: &SessionParameters, key: &str) -> Option<String> {
    match params.get(key) {
        None | Some(Value::Null) => None,
        Some(v) => Some(display(v)),
    }
}

/// Address search covering tickets opened in the last year.
pub fn address_query(params: &SessionParameters, now: NaiveDateTime) -> AddressQuery {
    let complement =
        optional_text(params, "endereco_complemento").filter(|c| c != "Não se aplica");
    AddressQuery {
        neighborhood_id: optional_text(params, "logradouro_id_bairro_ipp"),
        street_id: optional_text(params, "logradouro_id_ipp"),
        number: optional_text(params, "logradouro_numero"),
        complement,
        min_date: (now - Duration::days(365)).format("%Y-%m-%d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use webhooks_contracts::TicketSummary;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    fn protocol(classification: Value, status: &str, end_date: Option<&str>) -> Protocol {
        Protocol {
            protocol: Some("2024001".to_string()),
            tickets: vec![TicketSummary {
                classification,
                status: status.to_string(),
                end_date: end_date.map(str::to_string),
            }],
        }
    }

    #[test]
    fn open_bulky_waste_ticket_blocks() {
        let protocols = vec![protocol(json!(1607), "Pendente", None)];
        assert_eq!(evaluate(&protocols, today()), Eligibility::OpenTicket);
    }

    #[test]
    fn closed_within_twelve_days_blocks() {
        let protocols = vec![protocol(json!("1607"), "Fechado", Some("2024-05-08"))];
        assert_eq!(evaluate(&protocols, today()), Eligibility::RecentlyClosed);
        let protocols = vec![protocol(json!("1607"), "Fechado", Some("2024-05-07"))];
        assert_eq!(evaluate(&protocols, today()), Eligibility::Eligible);
    }

    #[test]
    fn other_services_are_ignored() {
        let protocols = vec![protocol(json!(1647), "Aberto", None)];
        assert_eq!(evaluate(&protocols, today()), Eligibility::Eligible);
        assert_eq!(evaluate(&[], today()), Eligibility::Eligible);
    }

    #[test]
    fn unreadable_close_date_is_unknown() {
        let protocols = vec![protocol(json!(1607), "Fechado", Some("20/05/2024"))];
        assert_eq!(evaluate(&protocols, today()), Eligibility::Unknown);
    }

    #[test]
    fn record_writes_justification() {
        let mut params = SessionParameters::new();
        Eligibility::OpenTicket.record(&mut params, "rebi_elegibilidade_abertura_chamado");
        assert_eq!(params["rebi_elegibilidade_abertura_chamado"], json!(false));
        assert_eq!(
            params["rebi_elegibilidade_abertura_chamado_justificativa"],
            json!("chamado_aberto")
        );
    }

    #[test]
    fn address_query_drops_placeholder_complement() {
        let params = match json!({
            "logradouro_id_bairro_ipp": "12",
            "logradouro_id_ipp": "345",
            "logradouro_numero": "10",
            "endereco_complemento": "Não se aplica"
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let now = today().and_hms_opt(9, 0, 0).unwrap();
        let query = address_query(&params, now);
        assert_eq!(query.complement, None);
        assert_eq!(query.street_id.as_deref(), Some("345"));
        assert_eq!(query.min_date, "2023-05-21");
    }
}
