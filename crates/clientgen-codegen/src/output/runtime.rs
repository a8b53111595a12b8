//! Support files every generated client needs.

use super::{RESULT_STEM, TYPES_DIR, ts_path};
use crate::artifact::{Artifact, ArtifactKind};
use crate::naming::quote;

const CLIENT_TEMPLATE: &str = r#"export interface ClientConfig {
  baseUrl: string;
  /** Bearer token for endpoints that require authentication. */
  getToken?: () => string | null | undefined | Promise<string | null | undefined>;
  headers?: Record<string, string>;
  fetch?: typeof fetch;
}

const config: ClientConfig = {
  baseUrl: __BASE_URL__,
};

export function configureClient(options: Partial<ClientConfig>): void {
  Object.assign(config, options);
}

export class ApiError extends Error {
  constructor(
    public readonly status: number,
    public readonly body: unknown,
  ) {
    super(`Request failed with status ${status}`);
    this.name = 'ApiError';
  }
}

export interface RequestOptions {
  method: string;
  query?: Record<string, unknown>;
  headers?: Record<string, string | null | undefined>;
  body?: unknown;
  auth?: boolean;
  responseType?: 'json' | 'blob' | 'void';
  signal?: AbortSignal;
}

function buildUrl(path: string, query?: Record<string, unknown>): string {
  const params = new URLSearchParams();
  for (const [key, value] of Object.entries(query ?? {})) {
    if (value === undefined || value === null) continue;
    if (Array.isArray(value)) {
      for (const item of value) params.append(key, String(item));
    } else {
      params.append(key, String(value));
    }
  }
  const search = params.toString();
  return config.baseUrl.replace(/\/+$/, '') + path + (search ? `?${search}` : '');
}

export async function apiFetch<T>(path: string, options: RequestOptions): Promise<T> {
  const headers: Record<string, string> = { ...config.headers };
  for (const [key, value] of Object.entries(options.headers ?? {})) {
    if (value !== undefined && value !== null) headers[key] = value;
  }
  if (options.auth && config.getToken) {
    const token = await config.getToken();
    if (token) headers['Authorization'] = `Bearer ${token}`;
  }

  let body: BodyInit | undefined;
  if (options.body instanceof FormData) {
    body = options.body;
  } else if (options.body !== undefined) {
    headers['Content-Type'] = 'application/json';
    body = JSON.stringify(options.body);
  }

  const doFetch = config.fetch ?? fetch;
  const response = await doFetch(buildUrl(path, options.query), {
    method: options.method,
    headers,
    body,
    signal: options.signal,
  });

  if (!response.ok) {
    const text = await response.text();
    let parsed: unknown = text;
    try {
      parsed = JSON.parse(text);
    } catch {
      // not JSON, keep the raw text
    }
    throw new ApiError(response.status, parsed);
  }
  if (options.responseType === 'blob') {
    return (await response.blob()) as T;
  }
  if (options.responseType === 'void' || response.status === 204) {
    return undefined as T;
  }
  return (await response.json()) as T;
}
"#;

const RESULT_TEMPLATE: &str = r#"export interface ResultError {
  code: string;
  message: string;
}

/** Outcome wrapper returned by endpoints that report failures in-band. */
export type Result<T> =
  | { isSuccess: true; value: T; errors?: never }
  | { isSuccess: false; value?: never; errors: ResultError[] };
"#;

/// `client.ts` with the configured base URL baked in.
pub fn render_client_runtime(base_url: &str) -> Artifact {
    let contents = CLIENT_TEMPLATE.replace("__BASE_URL__", &quote(base_url));
    Artifact::new(ArtifactKind::Runtime, "client.ts", contents)
}

/// `types/result.ts`.
pub fn render_result_type() -> Artifact {
    Artifact::new(
        ArtifactKind::Runtime,
        ts_path(TYPES_DIR, RESULT_STEM),
        RESULT_TEMPLATE.to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_quoted() {
        let artifact = render_client_runtime("https://api.example.com");
        assert!(artifact
            .contents
            .contains("  baseUrl: 'https://api.example.com',\n"));
        assert!(!artifact.contents.contains("__BASE_URL__"));
    }

    #[test]
    fn test_result_path() {
        assert_eq!(render_result_type().display_path(), "types/result.ts");
    }
}
