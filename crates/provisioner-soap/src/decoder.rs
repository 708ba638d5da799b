//! CreateSubscriber response decoding.

use provisioner_dispatcher::{DecodeError, DecodedResponse, ResponseDecoder};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Extracts `ResultHeader/ResultCode` and `ResultHeader/ResultDesc` from a
/// SOAP response.
///
/// Elements are matched by local name, so any namespace prefix is accepted.
/// A well-formed envelope without a result header decodes to an empty code.
/// A `Body/Fault` is reported as [`DecodeError::Fault`] with its
/// `faultstring`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoapResponseDecoder;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Code,
    Desc,
    Fault,
}

/// `Envelope/Body/<ResultMsg>/ResultHeader/{ResultCode,ResultDesc}` or
/// `Envelope/Body/Fault/faultstring`.
fn field_at(path: &[Vec<u8>]) -> Option<Field> {
    match path {
        [_, body, _, header, leaf] if body == b"Body" && header == b"ResultHeader" => {
            match leaf.as_slice() {
                b"ResultCode" => Some(Field::Code),
                b"ResultDesc" => Some(Field::Desc),
                _ => None,
            }
        }
        [_, body, fault, leaf] if body == b"Body" && fault == b"Fault" && leaf == b"faultstring" => {
            Some(Field::Fault)
        }
        _ => None,
    }
}

impl ResponseDecoder for SoapResponseDecoder {
    fn decode(&self, body: &[u8]) -> Result<DecodedResponse, DecodeError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(DecodeError::Empty);
        }

        let mut reader = Reader::from_reader(body);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut path: Vec<Vec<u8>> = Vec::new();
        let mut seen_root = false;
        let mut code = String::new();
        let mut desc = String::new();
        let mut fault: Option<String> = None;

        loop {
            let event = reader.read_event_into(&mut buf).map_err(|e| {
                DecodeError::Malformed(format!("at byte {}: {e}", reader.buffer_position()))
            })?;

            match event {
                Event::Start(e) => {
                    let name = e.local_name().as_ref().to_vec();
                    if path.is_empty() {
                        check_root(&name, seen_root)?;
                        seen_root = true;
                    }
                    path.push(name);
                }
                Event::Empty(e) => {
                    if path.is_empty() {
                        check_root(e.local_name().as_ref(), seen_root)?;
                        seen_root = true;
                    }
                }
                Event::End(_) => {
                    path.pop();
                }
                Event::Text(t) => {
                    if let Some(field) = field_at(&path) {
                        let text = t
                            .unescape()
                            .map_err(|e| DecodeError::Malformed(e.to_string()))?;
                        append(field, &text, &mut code, &mut desc, &mut fault);
                    }
                }
                Event::CData(t) => {
                    if let Some(field) = field_at(&path) {
                        let text = String::from_utf8_lossy(&t);
                        append(field, &text, &mut code, &mut desc, &mut fault);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !seen_root {
            return Err(DecodeError::Malformed("no root element".to_string()));
        }
        if !path.is_empty() {
            return Err(DecodeError::Malformed("unexpected end of document".to_string()));
        }
        if let Some(fault) = fault {
            return Err(DecodeError::Fault(fault));
        }

        Ok(DecodedResponse::new(code, desc))
    }
}

fn check_root(name: &[u8], seen_root: bool) -> Result<(), DecodeError> {
    if seen_root {
        return Err(DecodeError::Malformed("multiple root elements".to_string()));
    }
    if name != b"Envelope" {
        return Err(DecodeError::UnexpectedRoot(
            String::from_utf8_lossy(name).into_owned(),
        ));
    }
    Ok(())
}

fn append(field: Field, text: &str, code: &mut String, desc: &mut String, fault: &mut Option<String>) {
    match field {
        Field::Code => code.push_str(text),
        Field::Desc => desc.push_str(text),
        Field::Fault => fault.get_or_insert_with(String::new).push_str(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUCCESS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Body>
    <bcs:CreateSubscriberResultMsg xmlns:bcs="http://www.huawei.com/bme/cbsinterface/bcservices">
      <ResultHeader>
        <cbs:Version xmlns:cbs="http://www.huawei.com/bme/cbsinterface/cbscommon">1</cbs:Version>
        <cbs:ResultCode xmlns:cbs="http://www.huawei.com/bme/cbsinterface/cbscommon">0000</cbs:ResultCode>
        <cbs:ResultDesc xmlns:cbs="http://www.huawei.com/bme/cbsinterface/cbscommon">Operation successfully.</cbs:ResultDesc>
      </ResultHeader>
    </bcs:CreateSubscriberResultMsg>
  </soapenv:Body>
</soapenv:Envelope>"#;

    fn decode(body: &str) -> Result<DecodedResponse, DecodeError> {
        SoapResponseDecoder.decode(body.as_bytes())
    }

    #[test]
    fn test_extracts_result_header() {
        let decoded = decode(SUCCESS).unwrap();
        assert_eq!(decoded.code, "0000");
        assert_eq!(decoded.description, "Operation successfully.");
    }

    #[test]
    fn test_unprefixed_elements() {
        let body = "<Envelope><Body><CreateSubscriberResultMsg><ResultHeader>\
                    <ResultCode>102010004</ResultCode>\
                    <ResultDesc>The subscriber &amp; account already exist.</ResultDesc>\
                    </ResultHeader></CreateSubscriberResultMsg></Body></Envelope>";
        let decoded = decode(body).unwrap();
        assert_eq!(decoded.code, "102010004");
        assert_eq!(decoded.description, "The subscriber & account already exist.");
    }

    #[test]
    fn test_missing_result_header_gives_empty_code() {
        let body = "<s:Envelope xmlns:s=\"x\"><s:Body><Other/></s:Body></s:Envelope>";
        let decoded = decode(body).unwrap();
        assert!(decoded.code.is_empty());
    }

    #[test]
    fn test_soap_fault() {
        let body = "<soap:Envelope xmlns:soap=\"x\"><soap:Body><soap:Fault>\
                    <faultcode>soap:Server</faultcode>\
                    <faultstring>Authentication failed</faultstring>\
                    </soap:Fault></soap:Body></soap:Envelope>";
        assert_eq!(
            decode(body).unwrap_err(),
            DecodeError::Fault("Authentication failed".to_string())
        );
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(decode("").unwrap_err(), DecodeError::Empty);
        assert_eq!(decode("  \n").unwrap_err(), DecodeError::Empty);
    }

    #[test]
    fn test_wrong_root() {
        assert_eq!(
            decode("<html><body>502 Bad Gateway</body></html>").unwrap_err(),
            DecodeError::UnexpectedRoot("html".to_string())
        );
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            decode("<Envelope><Body></Envelope>").unwrap_err(),
            DecodeError::Malformed(_)
        ));
        assert!(matches!(
            decode("<Envelope><Body>").unwrap_err(),
            DecodeError::Malformed(_)
        ));
        assert!(matches!(
            decode("not xml at all").unwrap_err(),
            DecodeError::Malformed(_)
        ));
    }
}
