use super::type_expr::{parse_type_expression, TypeExpression};
use super::AnnotationTag;

/// Titles that may carry a `{type}` right after the title.
const TYPED_TITLES: &[&str] = &[
    "param", "arg", "argument", "property", "prop", "returns", "return", "typedef", "type",
    "throws", "exception", "enum", "member", "var",
];

/// Titles followed by a name (after the optional type).
const NAMED_TITLES: &[&str] = &["param", "arg", "argument", "property", "prop", "typedef"];

/// Parses the raw text of one tag, starting at its `@`.
///
/// Parse problems never abort: they are recorded in the tag's `errors` so the compiler can
/// reject the containing block.
pub(crate) fn parse_tag(raw: &str) -> AnnotationTag {
    let body = raw.trim_start().strip_prefix('@').unwrap_or(raw);
    let title_end = body.find(char::is_whitespace).unwrap_or(body.len());
    let title = &body[..title_end];
    let mut rest = body[title_end..].trim_start();

    let mut tag = AnnotationTag::new(title, "");

    if TYPED_TITLES.contains(&title) && rest.starts_with('{') {
        match split_braced(rest) {
            Some((type_source, remainder)) => {
                match parse_type_expression(type_source) {
                    Ok(expr) => tag.type_expr = Some(expr),
                    Err(message) => tag.errors.push(format!(
                        "Invalid type expression '{}': {}",
                        type_source.trim(),
                        message
                    )),
                }
                rest = remainder.trim_start();
            }
            None => {
                tag.errors.push("Braces are not balanced".to_string());
                rest = "";
            }
        }
    }

    if NAMED_TITLES.contains(&title) {
        let (name, optional, remainder) = split_name(rest);
        rest = remainder;

        match name {
            Some(name) => tag.name = Some(name.to_string()),
            None => tag.errors.push("Missing or invalid tag name".to_string()),
        }

        if optional {
            tag.type_expr = match tag.type_expr.take() {
                Some(expr) if !expr.is_optional() => Some(TypeExpression::optional(expr)),
                other => other,
            };
        }
    }

    tag.description = strip_hyphen(rest.trim()).to_string();
    tag
}

/// Splits `{...}rest` at the brace matching the opening one.
fn split_braced(input: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (i, c) in input.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some((&input[1..i], &input[i + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

/// Reads `name` or `[name]` / `[name=default]`, returning the name, whether it was
/// bracketed, and the remaining text.
fn split_name(input: &str) -> (Option<&str>, bool, &str) {
    if let Some(inner) = input.strip_prefix('[') {
        return match inner.find(']') {
            Some(end) => {
                let name = inner[..end].split('=').next().unwrap_or("").trim();
                let name = (!name.is_empty()).then_some(name);
                (name, true, &inner[end + 1..])
            }
            None => (None, true, ""),
        };
    }

    let end = input.find(char::is_whitespace).unwrap_or(input.len());
    let name = &input[..end];
    ((!name.is_empty()).then_some(name), false, &input[end..])
}

/// `- text` becomes `text`.
fn strip_hyphen(description: &str) -> &str {
    match description.strip_prefix('-') {
        Some(stripped) if stripped.starts_with(char::is_whitespace) => stripped.trim_start(),
        _ => description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_with_type_name_and_description() {
        let tag = parse_tag("@param {integer} query.limit - Max number of items");

        assert_eq!(tag.title, "param");
        assert_eq!(tag.name.as_deref(), Some("query.limit"));
        assert_eq!(tag.type_expr, Some(TypeExpression::named("integer")));
        assert_eq!(tag.description, "Max number of items");
        assert!(tag.errors.is_empty());
    }

    #[test]
    fn test_bracketed_name_wraps_type_in_optional() {
        let tag = parse_tag("@property {boolean} [isDone=false] - The Todo's status");

        assert_eq!(tag.name.as_deref(), Some("isDone"));
        assert_eq!(
            tag.type_expr,
            Some(TypeExpression::optional(TypeExpression::named("boolean")))
        );
        assert_eq!(tag.description, "The Todo's status");
    }

    #[test]
    fn test_already_optional_type_is_not_wrapped_twice() {
        let tag = parse_tag("@param {string=} [query.q]");
        assert_eq!(
            tag.type_expr,
            Some(TypeExpression::optional(TypeExpression::named("string")))
        );
    }

    #[test]
    fn test_returns_keeps_status_in_description() {
        let tag = parse_tag("@returns {Todo[]} 200 - An array of todos");

        assert_eq!(tag.title, "returns");
        assert!(tag.name.is_none());
        assert_eq!(
            tag.type_expr,
            Some(TypeExpression::array_of(TypeExpression::named("Todo")))
        );
        assert_eq!(tag.description, "200 - An array of todos");
    }

    #[test]
    fn test_event_is_plain_description() {
        let tag = parse_tag("@event GET: /todos - getTodos");

        assert_eq!(tag.title, "event");
        assert!(tag.type_expr.is_none());
        assert_eq!(tag.description, "GET: /todos - getTodos");
    }

    #[test]
    fn test_typedef_with_and_without_type() {
        let bare = parse_tag("@typedef Todo");
        assert_eq!(bare.name.as_deref(), Some("Todo"));
        assert!(bare.type_expr.is_none());

        let typed = parse_tag("@typedef {object} Todo - A thing to do");
        assert_eq!(typed.name.as_deref(), Some("Todo"));
        assert_eq!(typed.type_expr, Some(TypeExpression::named("object")));
        assert_eq!(typed.description, "A thing to do");
    }

    #[test]
    fn test_unbalanced_braces_recorded_as_error() {
        let tag = parse_tag("@param {string query.q");
        assert!(tag.errors.contains(&"Braces are not balanced".to_string()));
    }

    #[test]
    fn test_invalid_type_recorded_as_error() {
        let tag = parse_tag("@returns {Array<} 200 - nope");
        assert_eq!(tag.errors.len(), 1);
        assert!(tag.errors[0].starts_with("Invalid type expression 'Array<'"));
    }

    #[test]
    fn test_missing_name_recorded_as_error() {
        let tag = parse_tag("@param {string}");
        assert_eq!(tag.errors, vec!["Missing or invalid tag name".to_string()]);
    }
}
