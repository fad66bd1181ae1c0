use zbus::zvariant::Value;

/// Renders a property value as plain text.
///
/// Text-like values are printed bare, without the quoting of the GVariant text form, and nested
/// variants are unwrapped. Containers fall back to zvariant's GVariant rendering.
pub fn render(value: &Value<'_>) -> String {
    match value {
        Value::Str(s) => s.to_string(),
        Value::ObjectPath(p) => p.to_string(),
        Value::Signature(s) => s.to_string(),
        Value::Value(inner) => render(inner),
        Value::Bool(b) => b.to_string(),
        Value::U8(n) => n.to_string(),
        Value::I16(n) => n.to_string(),
        Value::U16(n) => n.to_string(),
        Value::I32(n) => n.to_string(),
        Value::U32(n) => n.to_string(),
        Value::I64(n) => n.to_string(),
        Value::U64(n) => n.to_string(),
        Value::F64(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text() {
        assert_eq!(render(&Value::from("online")), "online");
        assert_eq!(render(&Value::new(Value::from("offline"))), "offline");
    }

    #[test]
    fn numbers() {
        assert_eq!(render(&Value::from(42u32)), "42");
        assert_eq!(render(&Value::from(-1i64)), "-1");
        assert_eq!(render(&Value::from(true)), "true");
    }
}
