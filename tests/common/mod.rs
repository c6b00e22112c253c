//! Shared test helpers: synthetic libraries and symbol databases.

#![allow(dead_code)]

use object::write::{Object, StandardSection, Symbol, SymbolSection};
use object::{Architecture, BinaryFormat, Endianness, SymbolFlags, SymbolKind, SymbolScope};
use smbchk::{SymbolDatabase, VersionRecord};
use std::path::Path;

pub const CTOR: &str = "cyclus::Agent::Agent(cyclus::Context*)";
pub const DTOR: &str = "cyclus::Agent::~Agent()";

pub const CTOR_MANGLED: &str = "_ZN6cyclus5AgentC2EPNS_7ContextE";
pub const DTOR_MANGLED: &str = "_ZN6cyclus5AgentD2Ev";

/// How a symbol in a synthetic object should be emitted.
#[derive(Debug, Clone, Copy)]
pub enum Emit {
    Exported,
    Weak,
    Local,
    Imported,
}

/// Build a relocatable object holding the given symbols.
pub fn build_object(format: BinaryFormat, symbols: &[(&str, Emit)]) -> Vec<u8> {
    let mut obj = Object::new(format, Architecture::X86_64, Endianness::Little);
    let text = obj.section_id(StandardSection::Text);
    for (name, emit) in symbols {
        let (section, value, size, scope, weak) = match emit {
            Emit::Imported => (SymbolSection::Undefined, 0, 0, SymbolScope::Dynamic, false),
            other => {
                let off = obj.append_section_data(text, &[0xc3; 16], 16);
                let scope = match other {
                    Emit::Local => SymbolScope::Compilation,
                    _ => SymbolScope::Dynamic,
                };
                (
                    SymbolSection::Section(text),
                    off,
                    16,
                    scope,
                    matches!(other, Emit::Weak),
                )
            }
        };
        obj.add_symbol(Symbol {
            name: name.as_bytes().to_vec(),
            value,
            size,
            kind: SymbolKind::Text,
            scope,
            weak,
            section,
            flags: SymbolFlags::None,
        });
    }
    obj.write().expect("write synthetic object")
}

/// Place `bytes` at `<prefix>/lib/<name>`.
pub fn install_library(prefix: &Path, name: &str, bytes: &[u8]) {
    let lib = prefix.join("lib");
    std::fs::create_dir_all(&lib).unwrap();
    std::fs::write(lib.join(name), bytes).unwrap();
}

/// X = {ctor}, Y = {ctor, dtor}
pub fn xy_database() -> SymbolDatabase {
    SymbolDatabase::from(vec![
        VersionRecord::new([CTOR], "X", "x.x.x"),
        VersionRecord::new([CTOR, DTOR], "Y", "y.y.y"),
    ])
}

/// Build an x86-64 ELF shared library.
///
/// `.dynsym` holds `local` (STB_LOCAL), `exported` and `imported` (undefined).
/// `.symtab` holds `exported` plus `hidden` (STV_HIDDEN), which never reach
/// the dynamic table, as with a real `-fvisibility=hidden` build.
pub fn build_shared_library(
    exported: &[&str],
    local: &[&str],
    imported: &[&str],
    hidden: &[&str],
) -> Vec<u8> {
    use object::elf;
    use object::write::elf::{FileHeader, SectionHeader, Sym, Writer};

    let defined: Vec<&str> = local
        .iter()
        .chain(exported)
        .chain(hidden)
        .copied()
        .collect();
    let text_len = 16 * defined.len().max(1);
    let value_of = |name: &str| 16 * defined.iter().position(|d| *d == name).unwrap() as u64;
    let func = |bind: u8| (bind << 4) | elf::STT_FUNC;

    let mut buf: Vec<u8> = Vec::new();
    {
        let mut w = Writer::new(Endianness::Little, true, &mut buf);
        w.reserve_file_header();

        let text_name = w.add_section_name(b".text");
        let text_index = w.reserve_section_index();

        let dyn_local: Vec<_> = local
            .iter()
            .map(|n| w.add_dynamic_string(n.as_bytes()))
            .collect();
        let dyn_exported: Vec<_> = exported
            .iter()
            .map(|n| w.add_dynamic_string(n.as_bytes()))
            .collect();
        let dyn_imported: Vec<_> = imported
            .iter()
            .map(|n| w.add_dynamic_string(n.as_bytes()))
            .collect();
        for _ in 0..(local.len() + exported.len() + imported.len()) {
            w.reserve_dynamic_symbol_index();
        }
        w.reserve_dynstr_section_index();
        w.reserve_dynsym_section_index();

        let sym_exported: Vec<_> = exported.iter().map(|n| w.add_string(n.as_bytes())).collect();
        let sym_hidden: Vec<_> = hidden.iter().map(|n| w.add_string(n.as_bytes())).collect();
        for _ in 0..(exported.len() + hidden.len()) {
            w.reserve_symbol_index(Some(text_index));
        }
        w.reserve_strtab_section_index();
        w.reserve_symtab_section_index();
        w.reserve_shstrtab_section_index();

        let text_offset = w.reserve(text_len, 16);
        w.reserve_dynstr();
        w.reserve_dynsym();
        w.reserve_strtab();
        w.reserve_symtab();
        w.reserve_shstrtab();
        w.reserve_section_headers();

        w.write_file_header(&FileHeader {
            os_abi: elf::ELFOSABI_NONE,
            abi_version: 0,
            e_type: elf::ET_DYN,
            e_machine: elf::EM_X86_64,
            e_entry: 0,
            e_flags: 0,
        })
        .expect("write ELF header");

        w.pad_until(text_offset);
        w.write(&vec![0xc3; text_len]);

        w.write_dynstr();
        w.write_null_dynamic_symbol();
        for (name, id) in local.iter().zip(&dyn_local) {
            w.write_dynamic_symbol(&Sym {
                name: Some(*id),
                section: Some(text_index),
                st_info: func(elf::STB_LOCAL),
                st_other: elf::STV_DEFAULT,
                st_shndx: 0,
                st_value: value_of(name),
                st_size: 16,
            });
        }
        for (name, id) in exported.iter().zip(&dyn_exported) {
            w.write_dynamic_symbol(&Sym {
                name: Some(*id),
                section: Some(text_index),
                st_info: func(elf::STB_GLOBAL),
                st_other: elf::STV_DEFAULT,
                st_shndx: 0,
                st_value: value_of(name),
                st_size: 16,
            });
        }
        for id in &dyn_imported {
            w.write_dynamic_symbol(&Sym {
                name: Some(*id),
                section: None,
                st_info: func(elf::STB_GLOBAL),
                st_other: elf::STV_DEFAULT,
                st_shndx: elf::SHN_UNDEF,
                st_value: 0,
                st_size: 0,
            });
        }

        w.write_strtab();
        w.write_null_symbol();
        for (name, id) in exported.iter().zip(&sym_exported) {
            w.write_symbol(&Sym {
                name: Some(*id),
                section: Some(text_index),
                st_info: func(elf::STB_GLOBAL),
                st_other: elf::STV_DEFAULT,
                st_shndx: 0,
                st_value: value_of(name),
                st_size: 16,
            });
        }
        for (name, id) in hidden.iter().zip(&sym_hidden) {
            w.write_symbol(&Sym {
                name: Some(*id),
                section: Some(text_index),
                st_info: func(elf::STB_GLOBAL),
                st_other: elf::STV_HIDDEN,
                st_shndx: 0,
                st_value: value_of(name),
                st_size: 16,
            });
        }

        w.write_shstrtab();

        w.write_null_section_header();
        w.write_section_header(&SectionHeader {
            name: Some(text_name),
            sh_type: elf::SHT_PROGBITS,
            sh_flags: u64::from(elf::SHF_ALLOC | elf::SHF_EXECINSTR),
            sh_addr: 0,
            sh_offset: text_offset as u64,
            sh_size: text_len as u64,
            sh_link: 0,
            sh_info: 0,
            sh_addralign: 16,
            sh_entsize: 0,
        });
        w.write_dynstr_section_header(0);
        w.write_dynsym_section_header(0, 1 + local.len() as u32);
        w.write_strtab_section_header();
        w.write_symtab_section_header(1);
        w.write_shstrtab_section_header();
    }
    buf
}

/// Build an x86-64 PE DLL whose export directory names `exports`.
///
/// Like a stripped MinGW build, the image carries no COFF symbol table.
pub fn build_pe_dll(exports: &[&str]) -> Vec<u8> {
    use object::pe;
    use object::write::pe::{NtHeaders, Writer};

    let n = exports.len() as u32;
    let dll_name: &[u8] = b"libcyclus.dll\0";
    let names_len: u32 = exports.iter().map(|e| e.len() as u32 + 1).sum();
    let edata_len = 40 + 10 * n + dll_name.len() as u32 + names_len;

    let mut buf: Vec<u8> = Vec::new();
    {
        let mut w = Writer::new(true, 0x1000, 0x200, &mut buf);
        w.reserve_dos_header_and_stub();
        w.reserve_nt_headers(pe::IMAGE_NUMBEROF_DIRECTORY_ENTRIES);
        w.reserve_section_headers(2);
        let text = w.reserve_text_section(16 * n.max(1));
        let edata = w.reserve_edata_section(edata_len);

        // IMAGE_EXPORT_DIRECTORY followed by its tables and strings
        let functions = edata.virtual_address + 40;
        let names = functions + 4 * n;
        let ordinals = names + 4 * n;
        let dll = ordinals + 2 * n;
        let mut ed: Vec<u8> = Vec::with_capacity(edata_len as usize);
        // flags, timestamp, version, name, ordinal base, counts, table RVAs
        for field in [0u32, 0, 0, dll, 1, n, n, functions, names, ordinals] {
            ed.extend_from_slice(&field.to_le_bytes());
        }
        for i in 0..n {
            ed.extend_from_slice(&(text.virtual_address + 16 * i).to_le_bytes());
        }
        let mut name_rva = dll + dll_name.len() as u32;
        for e in exports {
            ed.extend_from_slice(&name_rva.to_le_bytes());
            name_rva += e.len() as u32 + 1;
        }
        for i in 0..n {
            ed.extend_from_slice(&(i as u16).to_le_bytes());
        }
        ed.extend_from_slice(dll_name);
        for e in exports {
            ed.extend_from_slice(e.as_bytes());
            ed.push(0);
        }
        assert_eq!(ed.len(), edata_len as usize);

        w.write_dos_header_and_stub().expect("write DOS header");
        w.write_nt_headers(NtHeaders {
            machine: pe::IMAGE_FILE_MACHINE_AMD64,
            time_date_stamp: 0,
            characteristics: pe::IMAGE_FILE_EXECUTABLE_IMAGE
                | pe::IMAGE_FILE_LARGE_ADDRESS_AWARE
                | pe::IMAGE_FILE_DLL,
            major_linker_version: 0,
            minor_linker_version: 0,
            address_of_entry_point: 0,
            image_base: 0x1_8000_0000,
            major_operating_system_version: 6,
            minor_operating_system_version: 0,
            major_image_version: 0,
            minor_image_version: 0,
            major_subsystem_version: 6,
            minor_subsystem_version: 0,
            subsystem: pe::IMAGE_SUBSYSTEM_WINDOWS_CUI,
            dll_characteristics: 0,
            size_of_stack_reserve: 0x10_0000,
            size_of_stack_commit: 0x1000,
            size_of_heap_reserve: 0x10_0000,
            size_of_heap_commit: 0x1000,
        });
        w.write_section_headers();
        w.write_section(text.file_offset, &vec![0xc3; (16 * n.max(1)) as usize]);
        w.write_section(edata.file_offset, &ed);
    }
    buf
}
