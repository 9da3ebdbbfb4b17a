use cypher_ast::ast::{Projection, ProjectionItem, Query, Variable};
use graphql_cypher_schema::{annotation::AuthorizationOperation, EntityKind, RelationshipWalker};

use super::{collected, member_branches, ProjectionBuilder};
use crate::{
    filter::Filter,
    options::{projected_order, property_order, Page},
    pattern, ResolvedField, TranslationError,
};

impl<'a> ProjectionBuilder<'_, 'a> {
    /// A relationship field: a subquery collecting the projected related
    /// nodes into one value. Interface and union targets read each member in
    /// its own `UNION` branch.
    pub(super) fn relationship(
        &mut self,
        source: &Variable,
        relationship: RelationshipWalker<'a>,
        field: &ResolvedField,
    ) -> Result<Variable, TranslationError> {
        let target = relationship.target();
        let is_list = relationship.get().is_list();

        let mut page = Page::from_options(field.object_argument("options"))?;

        if is_list {
            page = page.limited_by(target);
        }

        let result = self.ctx.value();
        let mut subquery = Query::new();
        subquery.import([source]);

        let projected = match target.kind() {
            EntityKind::Concrete => {
                let node = self.ctx.node();
                let edge = self.ctx.relationship();
                let pattern = pattern::read(source, relationship, Some(&edge), pattern::node(&node, target));

                Filter::build(
                    self.ctx,
                    &node,
                    target,
                    target,
                    field.object_argument("where"),
                    AuthorizationOperation::Read,
                )?
                .push_match(&mut subquery, pattern);

                let order = property_order(&node, target.name(), |name| target.find_attribute(name), &page.sort)?;
                page.push(self.ctx, &mut subquery, order);

                let mut nested = ProjectionBuilder::new(self.ctx);
                let map = nested.node(&node, target, &field.selection)?;
                nested.push_into(&mut subquery);

                subquery.with(Projection::items([ProjectionItem::aliased(map, node.clone())]));
                node
            }
            EntityKind::Interface | EntityKind::Union => {
                let item = self.ctx.value();
                let branches = member_branches(self.ctx, Some((source, relationship)), target, field, &page.sort, &item)?;

                subquery.call_union(branches);
                page.push(self.ctx, &mut subquery, projected_order(item.clone().into(), &page.sort));
                item
            }
        };

        subquery.returning(Projection::items([ProjectionItem::aliased(
            collected(projected, is_list),
            result.clone(),
        )]));

        self.subqueries.push(subquery);

        Ok(result)
    }
}
