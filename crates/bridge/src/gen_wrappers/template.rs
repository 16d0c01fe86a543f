use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde::Serialize;

use super::Language;

const TYPESCRIPT: &str = r#"// Auto-generated wrapper for {{source}}
// Route: {{route}}
type LegacyEvent = {
  httpMethod: string;
  path: string;
  queryStringParameters: Record<string, string>;
  headers: Record<string, string>;
  body: string;
  isBase64Encoded: boolean;
};
type LegacyResult = { statusCode?: number; headers?: Record<string, unknown>; body?: string } | undefined;
type LegacyHandler = (event: LegacyEvent, context: Record<string, never>) => Promise<LegacyResult> | LegacyResult;

async function loadHandler(): Promise<LegacyHandler> {
  const mod: any = await import('{{import_path}}');
  const candidates = [mod?.handler, mod?.default?.handler, mod?.default];
  const handler = candidates.find((candidate) => typeof candidate === 'function');
  if (!handler) throw new Error('{{missing_message}}');
  return handler;
}

function readBody(req: any): Promise<string> {
  return new Promise((resolve, reject) => {
    let body = '';
    req.on('data', (chunk: any) => { body += chunk; });
    req.on('end', () => resolve(body));
    req.on('error', reject);
  });
}

function toEvent(req: any, body: string): LegacyEvent {
  const url = new URL(req.url, '{{local_base}}');
  const headers: Record<string, string> = {};
  for (const [name, value] of Object.entries(req.headers ?? {})) {
    headers[name] = Array.isArray(value) ? value.join(', ') : String(value ?? '');
  }
  return {
    httpMethod: req.method,
    path: url.pathname,
    queryStringParameters: Object.fromEntries(url.searchParams.entries()),
    headers,
    body,
    isBase64Encoded: false,
  };
}

export default async function handler(req: any, res: any) {
  try {
    const body = await readBody(req);
    const event = toEvent(req, body);
    const fn = await loadHandler();
    const result = await fn(event, {});
    for (const [name, value] of Object.entries(result?.headers ?? {})) {
      if (value != null) res.setHeader(name, String(value));
    }
    res.status(result?.statusCode ?? 200).send(result?.body ?? '');
  } catch (err: any) {
    res.status(500).send(err?.message || 'Internal Error');
  }
}
"#;

const JAVASCRIPT: &str = r#"// Auto-generated wrapper for {{source}}
// Route: {{route}}
async function loadHandler() {
  const mod = await import('{{import_path}}');
  const candidates = [mod?.handler, mod?.default?.handler, mod?.default];
  const handler = candidates.find((candidate) => typeof candidate === 'function');
  if (!handler) throw new Error('{{missing_message}}');
  return handler;
}

function readBody(req) {
  return new Promise((resolve, reject) => {
    let body = '';
    req.on('data', (chunk) => { body += chunk; });
    req.on('end', () => resolve(body));
    req.on('error', reject);
  });
}

function toEvent(req, body) {
  const url = new URL(req.url, '{{local_base}}');
  const headers = {};
  for (const [name, value] of Object.entries(req.headers ?? {})) {
    headers[name] = Array.isArray(value) ? value.join(', ') : String(value ?? '');
  }
  return {
    httpMethod: req.method,
    path: url.pathname,
    queryStringParameters: Object.fromEntries(url.searchParams.entries()),
    headers,
    body,
    isBase64Encoded: false,
  };
}

export default async function handler(req, res) {
  try {
    const body = await readBody(req);
    const event = toEvent(req, body);
    const fn = await loadHandler();
    const result = await fn(event, {});
    for (const [name, value] of Object.entries(result?.headers ?? {})) {
      if (value != null) res.setHeader(name, String(value));
    }
    res.status(result?.statusCode ?? 200).send(result?.body ?? '');
  } catch (err) {
    res.status(500).send(err?.message || 'Internal Error');
  }
}
"#;

#[derive(Serialize)]
pub struct WrapperContext<'a> {
    pub source: &'a str,
    pub route: &'a str,
    pub import_path: String,
    pub missing_message: String,
    pub local_base: &'a str,
}

pub struct WrapperTemplates {
    registry: Handlebars<'static>,
}

impl WrapperTemplates {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(true);
        registry
            .register_template_string(Language::TypeScript.template_name(), TYPESCRIPT)
            .context("invalid typescript wrapper template")?;
        registry
            .register_template_string(Language::JavaScript.template_name(), JAVASCRIPT)
            .context("invalid javascript wrapper template")?;
        Ok(Self { registry })
    }

    pub fn render(&self, language: Language, ctx: &WrapperContext<'_>) -> Result<String> {
        self.registry
            .render(language.template_name(), ctx)
            .with_context(|| format!("failed to render wrapper for {}", ctx.source))
    }
}

/// Escapes `value` for a single-quoted JS string literal.
pub fn js_single_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => push_line_safe(&mut out, ch),
        }
    }
    out
}

/// Keeps `value` on a single line so it can sit inside a `//` comment.
pub fn comment_safe(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        push_line_safe(&mut out, ch);
    }
    out
}

fn push_line_safe(out: &mut String, ch: char) {
    match ch {
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\u{2028}' => out.push_str("\\u2028"),
        '\u{2029}' => out.push_str("\\u2029"),
        _ => out.push(ch),
    }
}
