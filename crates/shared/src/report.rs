//! CSV report of church clients for the super-admin console

use chrono::NaiveDate;

use crate::types::ChurchClient;

pub const CHURCH_REPORT_HEADER: [&str; 6] =
    ["Igreja", "Email", "Plano", "Status", "Membros", "Vencimento"];

/// Render the church client list as CSV.
///
/// Rows are separated by `\n`. Fields containing a comma, quote or line break
/// are quoted with embedded quotes doubled.
pub fn church_clients_csv(clients: &[ChurchClient]) -> String {
    let mut out = String::new();
    push_row(&mut out, CHURCH_REPORT_HEADER.iter().map(|h| h.to_string()));

    for client in clients {
        push_row(
            &mut out,
            [
                client.nome.clone(),
                client.email_admin.clone(),
                client.plano_nome.clone(),
                client.status.to_string(),
                client.membros_atuais.to_string(),
                client.data_expiracao.map(format_br_date).unwrap_or_default(),
            ]
            .into_iter(),
        );
    }

    out
}

/// Download name for the report generated on `today`
pub fn church_report_filename(today: NaiveDate) -> String {
    format!("relatorio_igrejas_{}.csv", today.format("%Y-%m-%d"))
}

/// `dd/mm/yyyy`, the pt-BR short date
pub fn format_br_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn push_row(out: &mut String, fields: impl Iterator<Item = String>) {
    if !out.is_empty() {
        out.push('\n');
    }
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(&field));
    }
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SubscriptionStatus;
    use uuid::Uuid;

    fn client(nome: &str, expira: Option<NaiveDate>) -> ChurchClient {
        ChurchClient {
            id: Uuid::new_v4(),
            nome: nome.to_string(),
            email_admin: "pastor@igreja.org".to_string(),
            plano_nome: "Profissional".to_string(),
            status: SubscriptionStatus::Ativa,
            data_expiracao: expira,
            membros_atuais: 42,
        }
    }

    #[test]
    fn test_header_only_for_empty_list() {
        assert_eq!(
            church_clients_csv(&[]),
            "Igreja,Email,Plano,Status,Membros,Vencimento"
        );
    }

    #[test]
    fn test_rows_use_br_dates() {
        let csv = church_clients_csv(&[client(
            "Igreja Central",
            NaiveDate::from_ymd_opt(2026, 3, 9),
        )]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "Igreja Central,pastor@igreja.org,Profissional,ativa,42,09/03/2026"
        );
    }

    #[test]
    fn test_fields_with_commas_and_quotes_are_quoted() {
        let csv = church_clients_csv(&[client("Igreja \"Luz\", Sede", None)]);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with("\"Igreja \"\"Luz\"\", Sede\","));
        assert!(row.ends_with(",42,"));
    }

    #[test]
    fn test_report_filename() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(church_report_filename(today), "relatorio_igrejas_2026-10-16.csv");
    }
}
