use std::collections::{hash_map, HashMap};

use prost_types::{
    field_descriptor_proto, DescriptorProto, FieldDescriptorProto, FileDescriptorProto,
};

use super::{
    Cardinality, EnumDescriptorInner, FieldDescriptorInner, MessageDescriptorInner,
    OneofDescriptorInner, TypeId, TypeMap,
};
use crate::descriptor::{
    make_full_name, to_index, to_json_name, DescriptorError, FieldIndex, FileIndex, MessageIndex,
    MAX_FIELD_NUMBER,
};

/// A message found while walking a file, in the order indices are assigned.
struct PendingMessage<'a> {
    full_name: Box<str>,
    raw: &'a DescriptorProto,
    parent: Option<MessageIndex>,
}

impl TypeMap {
    /// Adds every type declared in `raw_file` to this map.
    ///
    /// Names are registered first so that fields may refer to types declared later in the file.
    pub(in crate::descriptor) fn add_file(
        &mut self,
        file: FileIndex,
        raw_file: &FileDescriptorProto,
    ) -> Result<(), DescriptorError> {
        let is_proto3 = raw_file.syntax() == "proto3";

        let mut pending = Vec::new();
        for raw_message in &raw_file.message_type {
            collect_messages(raw_file.package(), raw_message, None, &mut pending, self);
        }

        let first_message = self.messages.len();
        for message in &pending {
            let index = to_index(self.messages.len());
            self.add_named_type(message.full_name.clone(), TypeId::new_message(index))?;
            self.messages.push(MessageDescriptorInner {
                full_name: message.full_name.clone(),
                file,
                parent: message.parent,
                fields: Box::default(),
                field_numbers: HashMap::new(),
                field_names: HashMap::new(),
                field_json_names: HashMap::new(),
                oneof_decls: Box::default(),
                extensions: Vec::new(),
            });
            for raw_enum in &message.raw.enum_type {
                self.add_enum(make_full_name(&message.full_name, raw_enum.name()))?;
            }
        }
        for raw_enum in &raw_file.enum_type {
            self.add_enum(make_full_name(raw_file.package(), raw_enum.name()))?;
        }

        for (offset, message) in pending.iter().enumerate() {
            let index = to_index(first_message + offset);
            self.add_message_fields(index, message, is_proto3)?;
        }

        for raw_extension in &raw_file.extension {
            self.add_extension(raw_file.package(), raw_extension, is_proto3)?;
        }
        for message in &pending {
            for raw_extension in &message.raw.extension {
                self.add_extension(&message.full_name, raw_extension, is_proto3)?;
            }
        }

        Ok(())
    }

    fn add_message_fields(
        &mut self,
        index: MessageIndex,
        message: &PendingMessage<'_>,
        is_proto3: bool,
    ) -> Result<(), DescriptorError> {
        let mut oneof_decls: Vec<OneofDescriptorInner> = message
            .raw
            .oneof_decl
            .iter()
            .map(|raw_oneof| OneofDescriptorInner {
                name: raw_oneof.name().into(),
                full_name: make_full_name(&message.full_name, raw_oneof.name()),
                fields: Vec::new(),
            })
            .collect();

        let mut fields = Vec::with_capacity(message.raw.field.len());
        let mut field_numbers = HashMap::with_capacity(message.raw.field.len());
        let mut field_names = HashMap::with_capacity(message.raw.field.len());
        let mut field_json_names = HashMap::with_capacity(message.raw.field.len());
        for raw_field in &message.raw.field {
            let field = self.build_field(&message.full_name, index, raw_field, is_proto3, false)?;
            let field_index: FieldIndex = to_index(self.fields.len());

            if field_numbers.insert(field.number, field_index).is_some() {
                return Err(DescriptorError::duplicate_field_number(
                    &message.full_name,
                    field.number,
                ));
            }
            if let Some(oneof_index) = field.oneof_index {
                if let Some(oneof) = oneof_decls.get_mut(oneof_index as usize) {
                    oneof.fields.push(field_index);
                }
            }
            field_names.insert(field.name.clone(), field_index);
            field_json_names.insert(field.json_name.clone(), field_index);
            fields.push(field_index);
            self.fields.push(field);
        }

        let inner = &mut self.messages[index as usize];
        inner.fields = fields.into_boxed_slice();
        inner.field_numbers = field_numbers;
        inner.field_names = field_names;
        inner.field_json_names = field_json_names;
        inner.oneof_decls = oneof_decls.into_boxed_slice();
        Ok(())
    }

    fn add_extension(
        &mut self,
        namespace: &str,
        raw_extension: &FieldDescriptorProto,
        is_proto3: bool,
    ) -> Result<(), DescriptorError> {
        let extendee = self.resolve_type_name(namespace, raw_extension.extendee())?;
        if !extendee.is_message() {
            return Err(DescriptorError::invalid_extendee(
                &make_full_name(namespace, raw_extension.name()),
                raw_extension.extendee(),
            ));
        }

        let field = self.build_field(namespace, extendee.1, raw_extension, is_proto3, true)?;
        let field_index = to_index(self.fields.len());
        self.fields.push(field);
        self.extensions.push(field_index);
        self.messages[extendee.1 as usize]
            .extensions
            .push(field_index);
        Ok(())
    }

    fn build_field(
        &self,
        namespace: &str,
        message: MessageIndex,
        raw_field: &FieldDescriptorProto,
        is_proto3: bool,
        is_extension: bool,
    ) -> Result<FieldDescriptorInner, DescriptorError> {
        let full_name = make_full_name(namespace, raw_field.name());

        let number = raw_field.number();
        if number < 1 || number as u32 > MAX_FIELD_NUMBER {
            return Err(DescriptorError::invalid_field_number(&full_name, number));
        }

        let is_group = raw_field.r#type == Some(field_descriptor_proto::Type::Group as i32);
        let ty = match raw_field.r#type {
            Some(_)
                if raw_field.r#type() != field_descriptor_proto::Type::Message
                    && raw_field.r#type() != field_descriptor_proto::Type::Enum
                    && !is_group =>
            {
                TypeId::new_scalar(raw_field.r#type())
            }
            _ => self.resolve_type_name(namespace, raw_field.type_name())?,
        };

        let cardinality = match raw_field.label() {
            field_descriptor_proto::Label::Optional => Cardinality::Optional,
            field_descriptor_proto::Label::Required => Cardinality::Required,
            field_descriptor_proto::Label::Repeated => Cardinality::Repeated,
        };

        let is_packed = cardinality == Cardinality::Repeated
            && ty.is_packable()
            && raw_field
                .options
                .as_ref()
                .and_then(|options| options.packed)
                .unwrap_or(is_proto3);

        let oneof_index = if raw_field.proto3_optional() {
            None
        } else {
            raw_field.oneof_index.map(|index| index as u32)
        };

        let supports_presence = cardinality != Cardinality::Repeated
            && (!is_proto3
                || is_extension
                || ty.is_message()
                || raw_field.oneof_index.is_some()
                || raw_field.proto3_optional());

        let json_name = match &raw_field.json_name {
            Some(json_name) => json_name.as_str().into(),
            None => to_json_name(raw_field.name()).into_boxed_str(),
        };

        Ok(FieldDescriptorInner {
            name: raw_field.name().into(),
            full_name,
            json_name,
            number: number as u32,
            message,
            is_extension,
            is_group,
            cardinality,
            is_packed,
            supports_presence,
            oneof_index,
            ty,
        })
    }

    fn add_enum(&mut self, full_name: Box<str>) -> Result<(), DescriptorError> {
        let index = to_index(self.enums.len());
        self.add_named_type(full_name.clone(), TypeId::new_enum(index))?;
        self.enums.push(EnumDescriptorInner { full_name });
        Ok(())
    }

    fn add_named_type(&mut self, full_name: Box<str>, ty: TypeId) -> Result<(), DescriptorError> {
        match self.named_types.entry(full_name) {
            hash_map::Entry::Occupied(entry) => {
                Err(DescriptorError::type_already_exists(entry.key()))
            }
            hash_map::Entry::Vacant(entry) => {
                entry.insert(ty);
                Ok(())
            }
        }
    }
}

fn collect_messages<'a>(
    namespace: &str,
    raw_message: &'a DescriptorProto,
    parent: Option<MessageIndex>,
    pending: &mut Vec<PendingMessage<'a>>,
    type_map: &TypeMap,
) {
    let full_name = make_full_name(namespace, raw_message.name());
    let index = to_index(type_map.messages.len() + pending.len());
    pending.push(PendingMessage {
        full_name: full_name.clone(),
        raw: raw_message,
        parent,
    });
    for raw_nested in &raw_message.nested_type {
        collect_messages(&full_name, raw_nested, Some(index), pending, type_map);
    }
}
