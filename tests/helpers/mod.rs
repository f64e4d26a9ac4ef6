use model_validator::model::*;

// =============================================================================
// Entity builders
// =============================================================================

/// Add an entity type with an `Id : int` primary key established by convention.
pub fn keyed_entity(
    builder: &mut ModelBuilder,
    name: &str,
    native: Option<NativeTypeId>,
) -> (EntityTypeId, KeyRef) {
    let id = builder.entity_type(name, native);
    let pk = add_primary_key(builder, id);
    (id, pk)
}

pub fn add_primary_key(builder: &mut ModelBuilder, entity: EntityTypeId) -> KeyRef {
    let prop = builder.property(entity, Property::new("Id", "int"));
    let key = builder.key(entity, vec![prop], ConfigurationSource::Convention);
    builder.primary_key(key);
    key
}

// =============================================================================
// Model fixtures
// =============================================================================

/// One concrete, keyed entity type with snapshot tracking.
pub fn single_entity_model() -> Model {
    let mut types = TypeRegistry::new();
    let blog = types.concrete("Blog", None);
    let mut builder = ModelBuilder::new(types);
    keyed_entity(&mut builder, "Blog", Some(blog));
    builder.build().unwrap()
}

/// A concrete entity type that can use change-notification tracking.
pub fn notifying_entity_model() -> Model {
    let mut types = TypeRegistry::new();
    let blog = types.register(
        "Blog",
        None,
        false,
        vec![
            NotificationContract::PropertyChanged,
            NotificationContract::PropertyChanging,
        ],
    );
    let mut builder = ModelBuilder::new(types);
    let (id, _) = keyed_entity(&mut builder, "Blog", Some(blog));
    builder.change_tracking_strategy(id, ChangeTrackingStrategy::ChangingAndChangedNotifications);
    builder.build().unwrap()
}

/// `Blog` declares an alternate key over the shadow property `BlogKey`,
/// established by `source`. When `referenced`, `Post.BlogKey` targets it with
/// navigations `Post.Blog` and `Blog.Posts`.
pub fn shadow_key_model(source: ConfigurationSource, referenced: bool) -> Model {
    let mut types = TypeRegistry::new();
    let blog_ty = types.concrete("Blog", None);
    let post_ty = types.concrete("Post", None);
    let list_ty = types.concrete("List<Post>", None);

    let mut builder = ModelBuilder::new(types);
    let (blog, _) = keyed_entity(&mut builder, "Blog", Some(blog_ty));
    let blog_key = builder.property(blog, Property::shadow("BlogKey", "int"));
    let alternate = builder.key(blog, vec![blog_key], source);

    let (post, _) = keyed_entity(&mut builder, "Post", Some(post_ty));
    if referenced {
        let fk_prop = builder.property(post, Property::new("BlogKey", "int"));
        builder.foreign_key(
            post,
            ForeignKey::new(vec![fk_prop], alternate)
                .with_dependent_to_principal(Navigation::reference("Blog"))
                .with_principal_to_dependent(Navigation::collection("Posts", list_ty)),
        );
    }

    builder.build().unwrap()
}

/// `Animal <- Cat` in both hierarchies. `abstract_animal` makes the root
/// abstract; `map_cat` controls whether `Cat` is mapped at all.
pub fn animal_model(abstract_animal: bool, map_cat: bool) -> Model {
    let mut types = TypeRegistry::new();
    let animal_ty = types.register("Animal", None, abstract_animal, vec![]);
    let cat_ty = types.concrete("Cat", Some(animal_ty));

    let mut builder = ModelBuilder::new(types);
    let (animal, _) = keyed_entity(&mut builder, "Animal", Some(animal_ty));
    if map_cat {
        let cat = builder.entity_type("Cat", Some(cat_ty));
        builder.base_type(cat, animal);
    }
    builder.build().unwrap()
}
