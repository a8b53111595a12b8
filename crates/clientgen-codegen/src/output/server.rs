//! Server-only variants of the client functions.
//!
//! Next.js gets server actions (`'use server'`); other frameworks get plain
//! wrappers guarded by the `server-only` package.

use super::client::Operation;
use super::{API_DIR, EndpointGroup, RenderContext, SERVER_DIR, ts_path};
use crate::artifact::{Artifact, ArtifactKind};
use crate::emitter::Emitter;
use crate::imports::Imports;
use crate::options::Framework;

pub fn render_server(cx: &RenderContext<'_>, group: &EndpointGroup<'_>) -> Artifact {
    let mut imports = Imports::new();
    let mut bodies = Vec::new();
    for endpoint in &group.endpoints {
        let op = Operation::new(cx, endpoint);
        for ty in op.signature_types() {
            cx.import_types(&mut imports, ty, false, &[]);
        }
        let mut e = Emitter::new();
        e.doc(endpoint.summary.as_deref());
        e.open(format!(
            "export async function {}({}): Promise<{}> {{",
            op.function,
            op.parameter_list(),
            op.returns
        ));
        e.line(format!("return api.{}({});", op.function, op.call_arguments()));
        e.close("}");
        bodies.push(e.finish());
    }

    let mut header = Vec::new();
    if cx.options.framework == Framework::Nextjs {
        header.push("'use server';".to_string());
        header.push(String::new());
    } else {
        header.push("import 'server-only';".to_string());
    }
    header.push(format!("import * as api from '../{}/{}';", API_DIR, group.stem()));
    header.extend(imports.render());

    let contents = format!("{}\n\n{}", header.join("\n"), bodies.join("\n"));
    Artifact::new(
        ArtifactKind::Server,
        ts_path(SERVER_DIR, &group.stem()),
        contents,
    )
}
