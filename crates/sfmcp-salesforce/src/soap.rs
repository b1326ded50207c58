//! SOAP payloads for the partner `login` call and the metadata `readMetadata`
//! call.

use quick_xml::escape::escape;
use secrecy::SecretString;
use serde_json::{Map, Value};
use sfmcp_core::{MetadataType, SalesforceError, SalesforceResult};
use url::Url;

use crate::xml::{self, XmlElement};

/// Fields of a successful partner login.
#[derive(Debug)]
pub struct LoginResult {
    pub session_id: SecretString,
    pub server_url: String,
    pub metadata_server_url: String,
    /// Scheme, host and port of `server_url`; base of every REST call.
    pub instance_url: String,
    pub user_id: Option<String>,
    pub organization_id: Option<String>,
    pub session_seconds_valid: Option<u64>,
}

pub fn login_envelope(username: &str, password: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8" ?>"#,
            r#"<env:Envelope xmlns:xsd="http://www.w3.org/2001/XMLSchema""#,
            r#" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance""#,
            r#" xmlns:env="http://schemas.xmlsoap.org/soap/envelope/">"#,
            r#"<env:Body><n1:login xmlns:n1="urn:partner.soap.sforce.com">"#,
            "<n1:username>{username}</n1:username>",
            "<n1:password>{password}</n1:password>",
            "</n1:login></env:Body></env:Envelope>"
        ),
        username = escape(username),
        password = escape(password),
    )
}

pub fn read_metadata_envelope(
    session_id: &str,
    metadata_type: MetadataType,
    full_names: &[String],
) -> String {
    let names: String = full_names
        .iter()
        .map(|name| format!("<fullNames>{}</fullNames>", escape(name.as_str())))
        .collect();

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8" ?>"#,
            r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/""#,
            r#" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            r#"<soapenv:Header><SessionHeader xmlns="http://soap.sforce.com/2006/04/metadata">"#,
            "<sessionId>{session_id}</sessionId>",
            "</SessionHeader></soapenv:Header>",
            r#"<soapenv:Body><readMetadata xmlns="http://soap.sforce.com/2006/04/metadata">"#,
            "<type>{metadata_type}</type>{names}",
            "</readMetadata></soapenv:Body></soapenv:Envelope>"
        ),
        session_id = escape(session_id),
        metadata_type = metadata_type.as_str(),
        names = names,
    )
}

/// Parse a partner login response. Faults become `LoginFailed`.
pub fn parse_login_response(body: &str) -> SalesforceResult<LoginResult> {
    let root = xml::parse(body)?;
    if let Some(fault) = fault_parts(&root) {
        return Err(SalesforceError::LoginFailed(fault.1));
    }

    let result = root
        .find("loginResponse")
        .and_then(|response| response.child("result"))
        .ok_or_else(|| missing("loginResponse/result"))?;

    let session_id = required_text(result, "sessionId")?;
    let server_url = required_text(result, "serverUrl")?;
    let metadata_server_url = required_text(result, "metadataServerUrl")?;
    let instance_url = Url::parse(&server_url)
        .map_err(|e| {
            SalesforceError::InvalidResponse(format!("serverUrl '{server_url}' is not a URL: {e}"))
        })?
        .origin()
        .ascii_serialization();

    let user_info = result.child("userInfo");
    let session_seconds_valid = user_info
        .and_then(|info| info.child_text("sessionSecondsValid"))
        .and_then(|seconds| seconds.trim().parse().ok());
    let organization_id = user_info
        .and_then(|info| info.child_text("organizationId"))
        .map(str::to_string);

    Ok(LoginResult {
        session_id: SecretString::from(session_id),
        server_url,
        metadata_server_url,
        instance_url,
        user_id: result.child_text("userId").map(str::to_string),
        organization_id,
        session_seconds_valid,
    })
}

/// Parse a `readMetadata` response into one JSON value per record.
///
/// Names that do not exist come back as empty records and are returned as
/// empty objects.
pub fn parse_read_metadata_response(body: &str) -> SalesforceResult<Vec<Value>> {
    let root = xml::parse(body)?;
    if let Some(error) = fault(&root) {
        return Err(error);
    }

    let result = root
        .find("readMetadataResponse")
        .ok_or_else(|| missing("readMetadataResponse"))?;

    Ok(result
        .find_all("records")
        .into_iter()
        .map(|record| match record.to_json() {
            Value::String(text) if text.trim().is_empty() => Value::Object(Map::new()),
            other => other,
        })
        .collect())
}

/// Map a SOAP fault, if the document carries one.
///
/// `INVALID_SESSION_ID` faults are reported as `SessionExpired` so callers can
/// re-authenticate.
pub fn fault(root: &XmlElement) -> Option<SalesforceError> {
    let (fault_code, message) = fault_parts(root)?;
    if fault_code.ends_with("INVALID_SESSION_ID") {
        return Some(SalesforceError::SessionExpired(message));
    }
    Some(SalesforceError::Fault {
        fault_code,
        message,
    })
}

fn fault_parts(root: &XmlElement) -> Option<(String, String)> {
    let fault = root.find("Fault")?;
    let fault_code = fault.child_text("faultcode").unwrap_or_default().to_string();
    let message = fault
        .child_text("faultstring")
        .filter(|message| !message.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("SOAP fault {fault_code}"));
    Some((fault_code, message))
}

fn required_text(element: &XmlElement, name: &str) -> SalesforceResult<String> {
    element
        .child_text(name)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or_else(|| missing(name))
}

fn missing(what: &str) -> SalesforceError {
    SalesforceError::InvalidResponse(format!("SOAP response is missing '{what}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serde_json::json;

    const LOGIN_OK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns="urn:partner.soap.sforce.com">
<soapenv:Body><loginResponse><result>
<metadataServerUrl>https://acme.my.salesforce.com/services/Soap/m/59.0/00D000000000001</metadataServerUrl>
<passwordExpired>false</passwordExpired>
<sandbox>false</sandbox>
<serverUrl>https://acme.my.salesforce.com/services/Soap/u/59.0/00D000000000001</serverUrl>
<sessionId>00D000000000001!AQ0AQFake</sessionId>
<userId>005000000000001</userId>
<userInfo><organizationId>00D000000000001</organizationId><sessionSecondsValid>7200</sessionSecondsValid></userInfo>
</result></loginResponse></soapenv:Body></soapenv:Envelope>"#;

    const LOGIN_FAULT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:sf="urn:fault.partner.soap.sforce.com">
<soapenv:Body><soapenv:Fault>
<faultcode>sf:INVALID_LOGIN</faultcode>
<faultstring>INVALID_LOGIN: Invalid username, password, security token; or user locked out.</faultstring>
</soapenv:Fault></soapenv:Body></soapenv:Envelope>"#;

    #[test]
    fn test_login_envelope_escapes_credentials() {
        let envelope = login_envelope("ops@example.com", "p<ss&word");
        assert!(envelope.contains("<n1:username>ops@example.com</n1:username>"));
        assert!(envelope.contains("<n1:password>p&lt;ss&amp;word</n1:password>"));
    }

    #[test]
    fn test_parse_login_response() {
        let login = parse_login_response(LOGIN_OK).unwrap();
        assert_eq!(login.session_id.expose_secret(), "00D000000000001!AQ0AQFake");
        assert_eq!(login.instance_url, "https://acme.my.salesforce.com");
        assert!(login.metadata_server_url.contains("/services/Soap/m/59.0/"));
        assert_eq!(login.user_id.as_deref(), Some("005000000000001"));
        assert_eq!(login.organization_id.as_deref(), Some("00D000000000001"));
        assert_eq!(login.session_seconds_valid, Some(7200));
    }

    #[test]
    fn test_parse_login_fault() {
        let err = parse_login_response(LOGIN_FAULT).unwrap_err();
        assert_eq!(
            err,
            SalesforceError::LoginFailed(
                "INVALID_LOGIN: Invalid username, password, security token; or user locked out."
                    .to_string()
            )
        );
    }

    #[test]
    fn test_read_metadata_envelope() {
        let envelope = read_metadata_envelope(
            "SESSION",
            MetadataType::ApexClass,
            &["Foo".to_string(), "Bar".to_string()],
        );
        assert!(envelope.contains("<sessionId>SESSION</sessionId>"));
        assert!(envelope.contains("<type>ApexClass</type><fullNames>Foo</fullNames><fullNames>Bar</fullNames>"));
    }

    #[test]
    fn test_parse_read_metadata_response() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns="http://soap.sforce.com/2006/04/metadata" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
<soapenv:Body><readMetadataResponse><result>
<records xsi:type="Flow"><fullName>Onboarding</fullName><status>Active</status></records>
<records xsi:type="Flow"/>
</result></readMetadataResponse></soapenv:Body></soapenv:Envelope>"#;

        let records = parse_read_metadata_response(body).unwrap();
        assert_eq!(
            records,
            vec![json!({"fullName": "Onboarding", "status": "Active"}), json!({})]
        );
    }

    #[test]
    fn test_invalid_session_fault() {
        let body = r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
<soapenv:Body><soapenv:Fault><faultcode>sf:INVALID_SESSION_ID</faultcode>
<faultstring>INVALID_SESSION_ID: Invalid Session ID found in SessionHeader</faultstring>
</soapenv:Fault></soapenv:Body></soapenv:Envelope>"#;

        let err = parse_read_metadata_response(body).unwrap_err();
        assert!(err.is_session_expired());
    }
}
