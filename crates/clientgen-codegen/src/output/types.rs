//! Structured-type interfaces and enum declarations, one file each.

use super::{RenderContext, TYPES_DIR, ts_path, with_imports};
use crate::artifact::{Artifact, ArtifactKind};
use crate::emitter::Emitter;
use crate::imports::Imports;
use crate::naming::{file_stem, property_key};
use clientgen_ir::TypeInfo;

pub fn render_type(cx: &RenderContext<'_>, ty: &TypeInfo) -> Artifact {
    let path = ts_path(TYPES_DIR, &file_stem(&ty.name));
    if ty.is_enum {
        Artifact::new(ArtifactKind::Enum, path, render_enum(ty))
    } else {
        Artifact::new(ArtifactKind::Type, path, render_interface(cx, ty))
    }
}

fn render_enum(ty: &TypeInfo) -> String {
    let mut e = Emitter::new();
    e.doc(ty.summary.as_deref());
    e.open(format!("export enum {} {{", ty.name));
    for member in &ty.enum_members {
        e.doc(member.summary.as_deref());
        e.line(format!("{} = {},", member.name, member.value));
    }
    e.close("}");
    e.finish()
}

fn render_interface(cx: &RenderContext<'_>, ty: &TypeInfo) -> String {
    let params = ty.type_parameter_names();
    let mut imports = Imports::new();
    let mut e = Emitter::new();

    e.doc(ty.summary.as_deref());
    let header = if params.is_empty() {
        ty.name.clone()
    } else {
        format!("{}<{}>", ty.name, params.join(", "))
    };
    e.open(format!("export interface {} {{", header));
    for prop in &ty.properties {
        let mapped = cx.map(&prop.type_info);
        let mut skip = params.clone();
        skip.push(&ty.name);
        cx.import_types(&mut imports, &mapped, true, &skip);

        let optional = if !prop.is_required && prop.is_nullable {
            "?"
        } else {
            ""
        };
        e.doc(prop.summary.as_deref());
        e.line(format!("{}{}: {};", property_key(&prop.json_name), optional, mapped));
    }
    e.close("}");
    with_imports(&imports, e.finish())
}
