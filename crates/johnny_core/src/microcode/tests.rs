use super::*;

fn codes(block: &MicroBlock) -> Vec<Option<u32>> {
    block.iter().map(MicroWord::code).collect()
}

fn some(values: &[u32]) -> Vec<Option<u32>> {
    values.iter().copied().map(Some).collect()
}

#[test]
fn builtin_descriptions_carry_200_slots_and_names() {
    assert_eq!(BONSAI_MC.split(';').count(), 206);
    assert_eq!(NORMAL_MC.split(';').count(), 211);
}

#[test]
fn parse_bonsai() {
    let program = MicrocodeProgram::parse(BONSAI_MC, Some(6));
    assert_eq!(program.instructions().len(), 6);
    assert_eq!(
        codes(&program.instructions()[0]),
        some(&[8, 2, 3, 5, 0, 0, 0, 0, 0, 0])
    );
    assert_eq!(
        program.operations(),
        ["FETCH", "INC", "DEC", "JMP", "TST", "HLT"]
    );
    assert_eq!(program.len(), 60);
}

#[test]
fn parse_normal() {
    let program = MicrocodeProgram::parse(NORMAL_MC, Some(11));
    assert_eq!(program.instructions().len(), 11);
    assert_eq!(
        codes(&program.instructions()[1]),
        some(&[12, 4, 2, 13, 9, 7, 0, 0, 0, 0])
    );
    assert_eq!(
        program.operations(),
        ["FETCH", "TAKE", "ADD", "SUB", "SAVE", "JMP", "TST", "INC", "DEC", "NULL", "HLT"]
    );
}

#[test]
fn detects_builtin_opcode_counts() {
    assert_eq!(MicrocodeProgram::parse(BONSAI_MC, None).operations().len(), 6);
    assert_eq!(MicrocodeProgram::parse(NORMAL_MC, None).operations().len(), 11);
    assert_eq!(
        &MicrocodeProgram::parse(BONSAI_MC, None),
        MicrocodeMode::Bonsai.program()
    );
}

#[test]
fn unknown_description_uses_default_count() {
    let text = "1;2;3;4;5;6;7;8;9;10;11;12;13;14;15;16;17;18;19;20;FETCH;TAKE;ADD;SUB;SAVE;JMP;TST;INC;DEC;NULL;HLT";
    let program = MicrocodeProgram::parse(text, None);
    assert_eq!(program.instructions().len(), 2);
    assert_eq!(program.operations().len(), DEFAULT_OPCODE_COUNT);
}

#[test]
fn short_final_group_is_zero_padded() {
    let program = MicrocodeProgram::parse("1;2;3;4;5;6;7;8;9;10;11;12;13;14;15;FETCH;TAKE;ADD", Some(3));
    assert_eq!(program.instructions().len(), 2);
    assert_eq!(
        codes(&program.instructions()[0]),
        some(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10])
    );
    assert_eq!(
        codes(&program.instructions()[1]),
        some(&[11, 12, 13, 14, 15, 0, 0, 0, 0, 0])
    );
    assert_eq!(program.operations(), ["FETCH", "TAKE", "ADD"]);
}

#[test]
fn malformed_token_does_not_abort_parse() {
    let program = MicrocodeProgram::parse("1;2;3;invalid;5;6;7;8;9;10;FETCH;TAKE", Some(2));
    assert_eq!(program.instructions().len(), 1);
    assert_eq!(program.instructions()[0].len(), 10);
    assert_eq!(program.instructions()[0][3], MicroWord::Invalid("invalid".into()));
    assert_eq!(program.instructions()[0][4], MicroWord::Code(5));
    assert_eq!(program.operations(), ["FETCH", "TAKE"]);
}

#[test]
fn zero_opcode_count_yields_empty_program() {
    let program = MicrocodeProgram::parse("", Some(0));
    assert!(program.instructions().is_empty());
    assert!(program.operations().is_empty());

    let program = MicrocodeProgram::parse("1;2;3;4;5;6;7;8;9;10;11;12;13;14;15", Some(0));
    assert!(program.instructions().is_empty());
    assert!(program.operations().is_empty());
    assert!(program.is_empty());
}

#[test]
fn count_larger_than_tokens_takes_everything_as_names() {
    let program = MicrocodeProgram::parse("FETCH;TAKE", Some(5));
    assert!(program.instructions().is_empty());
    assert_eq!(program.operations(), ["FETCH", "TAKE"]);
}

#[test]
fn strict_token_conversion() {
    assert_eq!(parse_token("13"), Ok(13));
    assert_eq!(parse_token(" 7 "), Ok(7));
    assert_eq!(parse_token(""), Ok(0));
    assert_eq!(
        parse_token("-1"),
        Err(MicrocodeError::InvalidToken("-1".to_string()))
    );
    assert_eq!(
        parse_token("1.5"),
        Err(MicrocodeError::InvalidToken("1.5".to_string()))
    );
}

#[test]
fn flatten_concatenates_blocks_in_order() {
    let program = MicrocodeMode::Normal.program();
    let flat = flatten(program);
    assert_eq!(flat.len(), 110);
    assert_eq!(flat[..4], [8u32, 2, 3, 5].map(MicroWord::Code));
    assert_eq!(flat[100], MicroWord::Code(19));
    assert_eq!(flat[101], MicroWord::Code(7));
}

#[test]
fn opcode_mapping_pads_to_two_digits() {
    let mapping = opcode_mapping(MicrocodeMode::Normal.program().operations());
    assert_eq!(mapping.len(), 11);
    assert_eq!(mapping["00"], "FETCH");
    assert_eq!(mapping["01"], "TAKE");
    assert_eq!(mapping["10"], "HLT");

    assert!(opcode_mapping::<&str>(&[]).is_empty());
    let mapping = opcode_mapping(&["TAKE", "TAKE", "ADD_OP"]);
    assert_eq!(mapping["00"], "TAKE");
    assert_eq!(mapping["01"], "TAKE");
    assert_eq!(mapping["02"], "ADD_OP");
}

#[test]
fn text_round_trips() {
    for mode in MicrocodeMode::ALL {
        let program = mode.program();
        let text = program.to_string();
        assert_eq!(&MicrocodeProgram::parse(&text, Some(mode.opcode_count())), program);
    }

    let program = MicrocodeProgram::parse("1;x;7;FETCH", Some(1));
    let text = program.to_string();
    assert!(text.starts_with("1;x;7;0;0;0;0;0;0;0;0;"));
    assert!(text.ends_with(";0;FETCH"));
    assert_eq!(text.split(';').count(), MICROCODE_TEXT_SLOTS + 1);
    assert_eq!(MicrocodeProgram::parse(&text, Some(1)), program);
}

#[test]
fn saved_builtin_reloads_without_count() {
    for mode in MicrocodeMode::ALL {
        let saved = mode.program().to_string();
        assert_eq!(saved, mode.text(), "{mode}");

        let reloaded = MicrocodeProgram::parse(&saved, None);
        assert_eq!(&reloaded, mode.program(), "{mode}");
    }

    let reloaded = MicrocodeProgram::parse(&MicrocodeMode::Bonsai.program().to_string(), None);
    let op = crate::cell::decode_ram(1020, &reloaded);
    assert_eq!(op.to_string(), "INC 020");
}

#[test]
fn long_program_renders_every_slot() {
    let blocks: Vec<MicroBlock> = (0..25)
        .map(|_| std::array::from_fn(|_| MicroWord::Code(7)))
        .collect();
    let program = MicrocodeProgram::new(blocks, vec!["A".to_string()]);
    assert_eq!(program.to_string().split(';').count(), 251);
}

#[test]
fn set_micro_op_rebuilds_both_forms() {
    let program = MicrocodeMode::Normal.program();
    let edited = program.set_micro_op(23, 14).unwrap();

    assert_eq!(edited.instructions()[2][3], MicroWord::Code(14));
    assert_eq!(edited.flatten()[23], MicroWord::Code(14));
    assert_eq!(edited.operations(), program.operations());
    // The original is untouched.
    assert_eq!(program.flatten()[23], MicroWord::Code(9));
}

#[test]
fn set_micro_op_rejects_out_of_range_slot() {
    let program = MicrocodeMode::Bonsai.program();
    assert_eq!(
        program.set_micro_op(60, 1),
        Err(MicrocodeError::SlotOutOfRange { index: 60, len: 60 })
    );
}

#[test]
fn builtin_programs_validate_cleanly() {
    for mode in MicrocodeMode::ALL {
        assert!(mode.program().validate_blocks().is_empty(), "{mode}");
    }
}

#[test]
fn validation_reports_broken_blocks() {
    let text = [
        "8;2;3;0;0;0;0;0;0;0", // fetch without dispatch
        "12;4;2;13;9;0;0;0;0;0", // no reset before padding
        "4;2;13;9;16;17;9;12;13;2", // no reset at all
        "0;0;0;0;0;0;0;0;0;0", // unused
        "19;7;0;0;0;0;0;0;0;0",
        "FETCH;A;B;C;HLT",
    ]
    .join(";");
    let program = MicrocodeProgram::parse(&text, Some(5));
    let findings = program.validate_blocks();
    let issues: Vec<_> = findings.iter().map(|f| (f.opcode, f.issue)).collect();
    assert_eq!(
        issues,
        [
            (0, BlockIssue::UnknownMicroOp { slot: 3 }),
            (1, BlockIssue::UnknownMicroOp { slot: 5 }),
            (2, BlockIssue::MissingReset),
        ]
    );
    assert_eq!(findings[2].name.as_deref(), Some("B"));

    let program = MicrocodeProgram::parse("8;2;3;9;9;9;9;9;9;9;FETCH", Some(1));
    assert_eq!(program.validate_blocks()[0].issue, BlockIssue::MissingDispatch);
}

#[test]
fn mode_names() {
    assert_eq!("normal".parse::<MicrocodeMode>(), Ok(MicrocodeMode::Normal));
    assert_eq!("Bonsai".parse::<MicrocodeMode>(), Ok(MicrocodeMode::Bonsai));
    assert_eq!(
        "turbo".parse::<MicrocodeMode>(),
        Err(MicrocodeError::UnknownMode("turbo".to_string()))
    );
    assert_eq!(MicrocodeMode::Bonsai.to_string(), "bonsai");
    assert_eq!(MicrocodeMode::default(), MicrocodeMode::Normal);
}

#[test]
fn listing_labels_macro_instructions() {
    let rows = MicrocodeMode::Normal.program().listing();
    assert_eq!(rows.len(), 110);
    assert_eq!(
        rows[0],
        ListingRow {
            address: "000".to_string(),
            label: "FETCH:".to_string(),
            description: "pc -> ab".to_string(),
        }
    );
    assert_eq!(rows[1].label, "");
    assert_eq!(rows[10].label, "TAKE:");
    assert_eq!(rows[10].description, "acc := 0");
    assert_eq!(rows[100].label, "HLT:");
    assert_eq!(rows[100].description, "halt");
    assert_eq!(rows[109].description, "0");
}

#[test]
fn describe_unknown_slots_verbatim() {
    assert_eq!(describe_micro_op(&MicroWord::Code(13)), "acc + db -> acc");
    assert_eq!(describe_micro_op(&MicroWord::Code(99)), "99");
    assert_eq!(describe_micro_op(&MicroWord::Invalid("abc".into())), "abc");
}
